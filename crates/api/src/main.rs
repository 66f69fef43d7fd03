use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use feed_core::{Catalog, Config, FeedEngine};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub engine: FeedEngine,
    /// Current catalog snapshot; replaced wholesale, never mutated in place
    pub catalog: RwLock<Arc<Catalog>>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Result<Self> {
        let engine = FeedEngine::new(config.ranking.clone())?;
        Ok(Self {
            config,
            engine,
            catalog: RwLock::new(Arc::new(catalog)),
        })
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().await.clone()
    }

    pub async fn replace_catalog(&self, catalog: Catalog) {
        *self.catalog.write().await = Arc::new(catalog);
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/feed", get(routes::feed::feed).post(routes::feed::feed_for_listings))
        .route("/catalog", post(routes::feed::replace_catalog))
        .route("/engagement", post(routes::engagement::engagement))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    info!(catalog_path = ?config.catalog_path, "Loading catalog");

    // A missing snapshot is not fatal: listings can be pushed via POST /catalog
    let catalog = if config.catalog_path.exists() {
        let catalog = Catalog::from_path(&config.catalog_path)?;
        let stats = catalog.stats();
        info!(
            listings = stats.listings,
            fixed_placement = stats.fixed_placement,
            search_boosted = stats.search_boosted,
            "Catalog loaded"
        );
        catalog
    } else {
        warn!(catalog_path = ?config.catalog_path, "Catalog file not found, starting empty");
        Catalog::default()
    };

    let state = Arc::new(AppState::new(config.clone(), catalog)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!(address = addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::{Request, StatusCode};
    use feed_core::{Listing, RankingConfig};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt as _;

    const BODY_LIMIT: usize = 1024 * 1024;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            catalog_path: PathBuf::from("/tmp/test-catalog.json"),
            api_port: 3000,
            ranking: RankingConfig::default(),
        };
        let catalog = Catalog::new(vec![
            Listing::new("pizza", "Pizzaria Roma")
                .with_tags(["pizza", "delivery"])
                .search_boosted(),
            Listing::new("sushi", "Sushi Bar").with_tags(["sushi"]),
            Listing::new("mercado", "Mercado Central").fixed_placement().with_engagement(4),
        ])
        .unwrap();
        Arc::new(AppState::new(config, catalog).unwrap())
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.expect("oneshot");
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("build request")
    }

    #[tokio::test]
    async fn health_reports_catalog() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(router(test_state()), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["listings"], 3);
        assert_eq!(body["fixed_placement"], 1);
    }

    #[tokio::test]
    async fn search_feed_over_snapshot() {
        let req = Request::builder()
            .uri("/feed?q=pizza%20delivery")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router(test_state()), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "search");
        assert_eq!(body["total_listings"], 1);
        assert_eq!(body["entries"][0]["type"], "listing");
        assert_eq!(body["entries"][0]["id"], "pizza");
        assert_eq!(body["entries"][0]["tier"], 1);
    }

    #[tokio::test]
    async fn browse_feed_puts_fixed_first() {
        let req = Request::builder()
            .uri("/feed?seed=7")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router(test_state()), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "browse");
        assert_eq!(body["total_listings"], 3);
        assert_eq!(body["entries"][0]["id"], "mercado");
    }

    #[tokio::test]
    async fn feed_for_inline_listings() {
        let payload = json!({
            "query": "açaí",
            "listings": [
                {"id": "a", "nome": "Açaí da Praça", "tags": "acai, sorvete", "anuncio": {"postagem": true}},
                {"id": "b", "nome": "Padaria", "tags": ["pao"], "anuncio": {"postagem": true}},
                {"id": "c", "nome": "Açaí Rascunho", "tags": ["acai"]}
            ]
        });
        let (status, body) = send(router(test_state()), post_json("/feed", payload)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_listings"], 1);
        assert_eq!(body["entries"][0]["id"], "a");
    }

    #[tokio::test]
    async fn feed_rejects_invalid_listing() {
        let payload = json!({
            "query": "x",
            "listings": [{"id": "", "name": "A", "published": true}]
        });
        let (status, _) = send(router(test_state()), post_json("/feed", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn catalog_replacement_is_visible_to_feed() {
        let state = test_state();
        let payload = json!([
            {"id": "only", "name": "Única Loja", "published": true},
            {"id": "draft", "name": "Rascunho"}
        ]);
        let (status, body) = send(router(state.clone()), post_json("/catalog", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["listings"], 1);

        let req = Request::builder().uri("/feed").body(Body::empty()).unwrap();
        let (_, body) = send(router(state), req).await;
        assert_eq!(body["total_listings"], 1);
        assert_eq!(body["entries"][0]["id"], "only");
    }

    #[tokio::test]
    async fn engagement_wraps_at_threshold() {
        let (status, body) = send(
            router(test_state()),
            post_json("/engagement", json!({ "current": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["next"], 0);
        assert_eq!(body["reset"], true);

        let (_, body) = send(
            router(test_state()),
            post_json("/engagement", json!({ "current": 2, "threshold": 10 })),
        )
        .await;
        assert_eq!(body["next"], 3);
        assert_eq!(body["reset"], false);
    }

    #[tokio::test]
    async fn engagement_rejects_zero_threshold() {
        let (status, _) = send(
            router(test_state()),
            post_json("/engagement", json!({ "current": 1, "threshold": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
