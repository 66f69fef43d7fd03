use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub listings: usize,
    pub fixed_placement: usize,
    pub search_boosted: usize,
    pub with_engagement: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.snapshot().await.stats();

    Json(HealthResponse {
        status: "ok",
        listings: stats.listings,
        fixed_placement: stats.fixed_placement,
        search_boosted: stats.search_boosted,
        with_engagement: stats.with_engagement,
    })
}
