pub mod ads;
pub mod browse;
pub mod config;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod feed;
pub mod listing;
pub mod normalize;
pub mod scoring;
pub mod tier;

pub use browse::{compose_browse_order, BrowseOrder};
pub use config::{Bm25Params, Config, FieldWeights, RankingConfig};
pub use engagement::{on_engagement, EngagementPolicy};
pub use engine::FeedEngine;
pub use error::{Error, Result};
pub use feed::{Feed, FeedEntry, FeedItem, FeedMode};
pub use listing::{Catalog, CatalogStats, Listing, RawListing, Sponsorship};
pub use tier::{classify, rank, ParsedQuery, ScoredListing, Tier};
