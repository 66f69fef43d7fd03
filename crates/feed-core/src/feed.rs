use crate::listing::Listing;
use crate::tier::{ScoredListing, Tier};
use serde::Serialize;

/// Whether a feed answers a query or the default browse screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    Search,
    Browse,
}

/// A listing placed in the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub listing: Listing,

    /// Relevance score; 0 in browse mode
    pub score: f64,

    /// Search tier; absent in browse mode
    pub tier: Option<Tier>,

    /// Part of the rotating featured window
    pub featured: bool,
}

impl FeedItem {
    pub fn browse(listing: Listing, featured: bool) -> Self {
        Self {
            listing,
            score: 0.0,
            tier: None,
            featured,
        }
    }
}

impl From<ScoredListing> for FeedItem {
    fn from(scored: ScoredListing) -> Self {
        Self {
            listing: scored.listing,
            score: scored.score,
            tier: Some(scored.tier),
            featured: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEntry {
    Listing(FeedItem),
    AdSlot { key: String },
}

impl FeedEntry {
    pub fn is_ad(&self) -> bool {
        matches!(self, FeedEntry::AdSlot { .. })
    }

    pub fn as_item(&self) -> Option<&FeedItem> {
        match self {
            FeedEntry::Listing(item) => Some(item),
            FeedEntry::AdSlot { .. } => None,
        }
    }
}

/// Ordered output of one ranking call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub mode: FeedMode,
    pub entries: Vec<FeedEntry>,
}

impl Feed {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &FeedItem> {
        self.entries.iter().filter_map(FeedEntry::as_item)
    }

    /// Listing ids in feed order, ads skipped
    pub fn listing_ids(&self) -> Vec<&str> {
        self.items().map(|item| item.listing.id.as_str()).collect()
    }

    pub fn ad_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ad()).count()
    }
}
