pub mod scrape;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use serde_json::json;

use crate::auth::{hash_key, require_api_key};
use crate::scraper::ScrapeOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ScrapeOrchestrator>,
    pub api_key_hash: Arc<String>,
}

impl AppState {
    pub fn new(orchestrator: ScrapeOrchestrator, api_key: &str) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            api_key_hash: Arc::new(hash_key(api_key)),
        }
    }
}

async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "message": "Welcome to the Job Scraper API!" }))
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/scrape", post(scrape::scrape))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state);

    Router::new().route("/", get(root)).merge(protected)
}
