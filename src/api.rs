// src/api.rs
use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::pipeline::config::FeedConfig;
use crate::pipeline::types::BodyFetcher;
use crate::{proxy, ws};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn BodyFetcher>,
    pub config: Arc<FeedConfig>,
    pub proxy_client: reqwest::Client,
}

/// Core routes: health, the globe WebSocket feed, the cross-origin resource
/// proxy, and the static frontend as fallback. The /metrics router is merged
/// on top by the binary (its recorder is process-global).
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/globe", get(ws::globe_ws))
        .route("/proxyhttp/{*resource}", get(proxy::proxy_resource))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::very_permissive())
}
