use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Per-field multipliers applied to the BM25 field scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub name: f64,
    pub tags: f64,
    pub description: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 4.5,
            tags: 6.0,
            description: 1.0,
        }
    }
}

/// BM25 shape parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation
    pub k1: f64,

    /// Length normalization strength, in [0, 1]
    pub b: f64,

    /// Lower-bound additive delta applied to every matching term (BM25+)
    pub delta: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            delta: 1.0,
        }
    }
}

/// Knobs for a single ranking invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: FieldWeights,
    pub bm25: Bm25Params,

    /// Number of popular listings rotated at the top of the browse feed
    pub featured_window_size: usize,

    /// Listings between two consecutive ad slots
    pub ad_cadence: usize,

    /// Engagement value at which the counter wraps back to zero
    pub engagement_reset_threshold: u32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            bm25: Bm25Params::default(),
            featured_window_size: 3,
            ad_cadence: 15,
            engagement_reset_threshold: 7,
        }
    }
}

impl RankingConfig {
    /// Check the values once, before the config is handed to an engine
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("name weight", self.weights.name),
            ("tags weight", self.weights.tags),
            ("description weight", self.weights.description),
            ("k1", self.bm25.k1),
            ("delta", self.bm25.delta),
        ];
        for (label, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    label, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(Error::Config(format!(
                "b must be within [0, 1], got {}",
                self.bm25.b
            )));
        }

        if self.ad_cadence == 0 {
            return Err(Error::Config("ad cadence must be at least 1".to_string()));
        }

        if self.engagement_reset_threshold == 0 {
            return Err(Error::Config(
                "engagement reset threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the catalog snapshot (JSON array of listings)
    pub catalog_path: PathBuf,

    /// API server port
    pub api_port: u16,

    /// Ranking parameters shared by every request
    pub ranking: RankingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = RankingConfig::default();
        let ranking = RankingConfig {
            weights: FieldWeights {
                name: parse_var("RANK_WEIGHT_NAME").unwrap_or(defaults.weights.name),
                tags: parse_var("RANK_WEIGHT_TAGS").unwrap_or(defaults.weights.tags),
                description: parse_var("RANK_WEIGHT_DESCRIPTION")
                    .unwrap_or(defaults.weights.description),
            },
            bm25: Bm25Params {
                k1: parse_var("RANK_BM25_K1").unwrap_or(defaults.bm25.k1),
                b: parse_var("RANK_BM25_B").unwrap_or(defaults.bm25.b),
                delta: parse_var("RANK_BM25_DELTA").unwrap_or(defaults.bm25.delta),
            },
            featured_window_size: parse_var("FEATURED_WINDOW_SIZE")
                .unwrap_or(defaults.featured_window_size),
            ad_cadence: parse_var("AD_CADENCE").unwrap_or(defaults.ad_cadence),
            engagement_reset_threshold: parse_var("ENGAGEMENT_RESET_THRESHOLD")
                .unwrap_or(defaults.engagement_reset_threshold),
        };
        ranking.validate()?;

        Ok(Self {
            catalog_path: env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/catalog.json")),

            api_port: parse_var("API_PORT").unwrap_or(3000),

            ranking,
        })
    }

    /// Create a test configuration
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            catalog_path: PathBuf::from("/tmp/test-catalog.json"),
            api_port: 3000,
            ranking: RankingConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::test();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.ranking.featured_window_size, 3);
        assert_eq!(config.ranking.ad_cadence, 15);
        assert_eq!(config.ranking.engagement_reset_threshold, 7);
    }

    #[test]
    fn test_default_weights_rank_tags_above_name_above_description() {
        let weights = FieldWeights::default();
        assert!(weights.tags > weights.name);
        assert!(weights.name > weights.description);
    }

    #[test]
    fn test_default_ranking_config_is_valid() {
        assert!(RankingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cadence() {
        let config = RankingConfig {
            ad_cadence: 0,
            ..RankingConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let config = RankingConfig {
            engagement_reset_threshold: 0,
            ..RankingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bm25_params() {
        let mut config = RankingConfig::default();
        config.bm25.b = 1.5;
        assert!(config.validate().is_err());

        let mut config = RankingConfig::default();
        config.bm25.k1 = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RankingConfig::default();
        config.weights.tags = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_ranking_config_from_json_uses_defaults() {
        let config: RankingConfig =
            serde_json::from_str(r#"{"featured_window_size": 5}"#).unwrap();
        assert_eq!(config.featured_window_size, 5);
        assert_eq!(config.ad_cadence, 15);
        assert_eq!(config.weights, FieldWeights::default());
    }
}
