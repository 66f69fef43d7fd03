use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use feed_core::EngagementPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct EngagementRequest {
    /// Counter value currently stored for the listing
    pub current: u32,

    /// Overrides the configured reset threshold
    pub threshold: Option<u32>,
}

#[derive(Serialize)]
pub struct EngagementResponse {
    pub next: u32,
    pub reset: bool,
    pub threshold: u32,
}

/// Next counter value for a contact tap. The caller owns the stored counter.
pub async fn engagement(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EngagementRequest>,
) -> Result<Json<EngagementResponse>, (StatusCode, String)> {
    let policy = match request.threshold {
        Some(0) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "threshold must be at least 1".to_string(),
            ))
        }
        Some(threshold) => EngagementPolicy::new(threshold),
        None => state.engine.engagement_policy(),
    };

    Ok(Json(EngagementResponse {
        next: policy.next(request.current),
        reset: policy.resets_after(request.current),
        threshold: policy.threshold,
    }))
}
