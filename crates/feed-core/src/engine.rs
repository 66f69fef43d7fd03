use crate::ads::interleave_ads;
use crate::browse::compose_browse_order;
use crate::config::RankingConfig;
use crate::engagement::EngagementPolicy;
use crate::error::Result;
use crate::feed::{Feed, FeedItem, FeedMode};
use crate::listing::Listing;
use crate::tier::{rank, ParsedQuery};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Turns a catalog snapshot and a query into the feed shown to the user.
///
/// Holds only the validated configuration; every call builds its own
/// term statistics, so one engine can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct FeedEngine {
    config: RankingConfig,
}

impl FeedEngine {
    pub fn new(config: RankingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn engagement_policy(&self) -> EngagementPolicy {
        EngagementPolicy::from_config(&self.config)
    }

    /// Build the feed. Queries without searchable terms browse instead.
    pub fn build_feed<R: Rng + ?Sized>(
        &self,
        listings: &[Listing],
        query: &str,
        rng: &mut R,
    ) -> Feed {
        let parsed = ParsedQuery::parse(query);

        let feed = if parsed.is_empty() {
            self.browse(listings, rng)
        } else {
            self.search(listings, &parsed)
        };

        debug!(
            mode = ?feed.mode,
            candidates = listings.len(),
            entries = feed.len(),
            ads = feed.ad_count(),
            "Feed built"
        );

        feed
    }

    /// `build_feed` with a fresh OS-seeded generator
    pub fn build_feed_with_os_rng(&self, listings: &[Listing], query: &str) -> Feed {
        let mut rng = StdRng::from_os_rng();
        self.build_feed(listings, query, &mut rng)
    }

    /// `build_feed` with a reproducible generator
    pub fn build_feed_seeded(&self, listings: &[Listing], query: &str, seed: u64) -> Feed {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_feed(listings, query, &mut rng)
    }

    fn search(&self, listings: &[Listing], query: &ParsedQuery) -> Feed {
        let ranked: Vec<FeedItem> = rank(listings, query, &self.config)
            .into_iter()
            .map(FeedItem::from)
            .collect();

        Feed {
            mode: FeedMode::Search,
            entries: interleave_ads(ranked, 0, &self.config),
        }
    }

    fn browse<R: Rng + ?Sized>(&self, listings: &[Listing], rng: &mut R) -> Feed {
        let order = compose_browse_order(listings, &self.config, rng);
        let fixed_count = order.fixed.len();

        let mut items = Vec::with_capacity(order.len());
        items.extend(order.fixed.into_iter().map(|l| FeedItem::browse(l, false)));
        items.extend(order.featured.into_iter().map(|l| FeedItem::browse(l, true)));
        items.extend(order.remainder.into_iter().map(|l| FeedItem::browse(l, false)));

        Feed {
            mode: FeedMode::Browse,
            entries: interleave_ads(items, fixed_count, &self.config),
        }
    }
}

impl Default for FeedEngine {
    fn default() -> Self {
        Self {
            config: RankingConfig::default(),
        }
    }
}
