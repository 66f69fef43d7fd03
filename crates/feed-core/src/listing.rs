use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Paid placement flags of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsorship {
    /// Guaranteed top-of-browse placement
    pub fixed_placement: bool,

    /// Elevated placement when the tags match the active query
    pub search_boosted: bool,
}

/// Canonical listing record read by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sponsorship: Sponsorship,
    #[serde(default)]
    pub engagement_count: u32,
}

impl Listing {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            sponsorship: Sponsorship::default(),
            engagement_count: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn fixed_placement(mut self) -> Self {
        self.sponsorship.fixed_placement = true;
        self
    }

    pub fn search_boosted(mut self) -> Self {
        self.sponsorship.search_boosted = true;
        self
    }

    pub fn with_engagement(mut self, count: u32) -> Self {
        self.engagement_count = count;
        self
    }

    /// Tags joined with single spaces, as matched by the phrase rule
    pub fn tag_text(&self) -> String {
        self.tags.join(" ")
    }
}

/// Tags as stored upstream: either a list or one joined string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<String>),
    Joined(String),
}

impl RawTags {
    fn into_vec(self) -> Vec<String> {
        let tags: Vec<String> = match self {
            RawTags::List(tags) => tags,
            RawTags::Joined(joined) if joined.contains(',') => {
                joined.split(',').map(String::from).collect()
            }
            RawTags::Joined(joined) => joined.split_whitespace().map(String::from).collect(),
        };

        tags.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSponsorship {
    #[serde(default, alias = "premium")]
    pub fixed_placement: Option<bool>,

    #[serde(default, alias = "busca")]
    pub search_boosted: Option<bool>,

    #[serde(default, alias = "postagem")]
    pub published: Option<bool>,
}

/// Listing record as it arrives from the catalog store, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub id: String,

    #[serde(alias = "nome")]
    pub name: String,

    #[serde(default, alias = "descricao")]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Option<RawTags>,

    #[serde(default, alias = "anuncio")]
    pub sponsorship: Option<RawSponsorship>,

    #[serde(default, alias = "clicks")]
    pub engagement_count: Option<i64>,

    #[serde(default)]
    pub published: Option<bool>,
}

impl RawListing {
    /// Whether the catalog exposes this record at all. Only an explicit
    /// `published` or `anuncio.postagem` flag publishes a record.
    pub fn is_published(&self) -> bool {
        self.published
            .or_else(|| self.sponsorship.as_ref().and_then(|s| s.published))
            .unwrap_or(false)
    }

    /// Validate and convert into the canonical shape
    pub fn into_listing(self) -> Result<Listing> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::InvalidListing("empty id".to_string()));
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidListing(format!("empty name for {}", id)));
        }

        let engagement_count = match self.engagement_count {
            Some(count) if count < 0 => {
                warn!(id = %id, count, "Negative engagement count, clamping to zero");
                0
            }
            Some(count) => u32::try_from(count).unwrap_or(u32::MAX),
            None => 0,
        };

        let sponsorship = self
            .sponsorship
            .map(|s| Sponsorship {
                fixed_placement: s.fixed_placement.unwrap_or(false),
                search_boosted: s.search_boosted.unwrap_or(false),
            })
            .unwrap_or_default();

        Ok(Listing {
            id,
            name,
            description: self.description.unwrap_or_default(),
            tags: self.tags.map(RawTags::into_vec).unwrap_or_default(),
            sponsorship,
            engagement_count,
        })
    }
}

/// Counts reported by health checks and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub listings: usize,
    pub fixed_placement: usize,
    pub search_boosted: usize,
    pub with_engagement: usize,
}

/// Immutable snapshot of published listings
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    listings: Vec<Listing>,
}

impl Catalog {
    /// Build a snapshot from already-canonical listings
    pub fn new(listings: Vec<Listing>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(listings.len());
        for listing in &listings {
            if !seen.insert(listing.id.as_str()) {
                return Err(Error::DuplicateListing(listing.id.clone()));
            }
        }
        Ok(Self { listings })
    }

    /// Drop unpublished records, validate the rest
    pub fn from_raw(raw: Vec<RawListing>) -> Result<Self> {
        let total = raw.len();
        let listings = raw
            .into_iter()
            .filter(RawListing::is_published)
            .map(RawListing::into_listing)
            .collect::<Result<Vec<_>>>()?;

        debug!(total, published = listings.len(), "Catalog records validated");
        Self::new(listings)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Vec<RawListing> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        self.listings
            .iter()
            .fold(CatalogStats::default(), |mut stats, listing| {
                stats.listings += 1;
                if listing.sponsorship.fixed_placement {
                    stats.fixed_placement += 1;
                }
                if listing.sponsorship.search_boosted {
                    stats.search_boosted += 1;
                }
                if listing.engagement_count > 0 {
                    stats.with_engagement += 1;
                }
                stats
            })
    }
}
