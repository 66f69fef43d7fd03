use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use feed_core::{Catalog, Feed, FeedEngine, FeedEntry, FeedMode, Listing, RawListing};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct FeedQuery {
    /// Search text; empty or absent means browse
    #[serde(default)]
    pub q: String,

    /// Fixes the browse rotation, mainly for debugging
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct FeedRequest {
    pub listings: Vec<RawListing>,
    #[serde(default)]
    pub query: String,
    pub seed: Option<u64>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub mode: FeedMode,
    pub entries: Vec<EntryResponse>,
    pub total_listings: usize,
    pub query_time_ms: f64,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryResponse {
    Listing {
        id: String,
        name: String,
        tags: Vec<String>,
        score: f64,
        /// 1 (highest) to 6; absent in browse mode
        #[serde(skip_serializing_if = "Option::is_none")]
        tier: Option<u8>,
        featured: bool,
    },
    Ad {
        key: String,
    },
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub listings: usize,
}

/// Feed over the loaded catalog snapshot
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let start = std::time::Instant::now();
    let catalog = state.snapshot().await;

    let feed = build(&state.engine, catalog.listings(), &params.q, params.seed);
    Json(to_response(feed, start))
}

/// Feed over listings supplied by the caller
pub async fn feed_for_listings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedRequest>,
) -> Result<Json<FeedResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();

    let catalog = Catalog::from_raw(request.listings)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let feed = build(&state.engine, catalog.listings(), &request.query, request.seed);
    Ok(Json(to_response(feed, start)))
}

/// Swap the served snapshot
pub async fn replace_catalog(
    State(state): State<Arc<AppState>>,
    Json(listings): Json<Vec<RawListing>>,
) -> Result<Json<CatalogResponse>, (StatusCode, String)> {
    let catalog =
        Catalog::from_raw(listings).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let count = catalog.len();

    state.replace_catalog(catalog).await;
    info!(listings = count, "Catalog replaced");

    Ok(Json(CatalogResponse { listings: count }))
}

fn build(engine: &FeedEngine, listings: &[Listing], query: &str, seed: Option<u64>) -> Feed {
    match seed {
        Some(seed) => engine.build_feed_seeded(listings, query, seed),
        None => engine.build_feed_with_os_rng(listings, query),
    }
}

fn to_response(feed: Feed, start: std::time::Instant) -> FeedResponse {
    let total_listings = feed.items().count();
    let entries = feed
        .entries
        .into_iter()
        .map(|entry| match entry {
            FeedEntry::Listing(item) => EntryResponse::Listing {
                id: item.listing.id,
                name: item.listing.name,
                tags: item.listing.tags,
                score: item.score,
                tier: item.tier.map(|t| t.level()),
                featured: item.featured,
            },
            FeedEntry::AdSlot { key } => EntryResponse::Ad { key },
        })
        .collect();

    FeedResponse {
        mode: feed.mode,
        entries,
        total_listings,
        query_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}
