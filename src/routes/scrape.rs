use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::AppState;
use crate::scraper::ScrapeSummary;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub batch_id: Uuid,
    pub keywords: Vec<String>,
    pub results: ScrapeSummary,
}

/// POST /scrape
///
/// Runs one scrape batch to completion. Per-job failures show up in the
/// counters; only an aborted batch becomes an error response.
pub async fn scrape(
    State(state): State<AppState>,
    Json(input): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, AppError> {
    if input.keywords.is_empty() {
        return Err(AppError::BadRequest("No keywords provided".to_string()));
    }

    let batch_id = Uuid::new_v4();
    tracing::info!("Received scrape request {batch_id} with keywords: {:?}", input.keywords);

    let results = state
        .orchestrator
        .scrape(&input.keywords)
        .instrument(tracing::info_span!("scrape_batch", %batch_id))
        .await?;

    Ok(Json(ScrapeResponse {
        message: "Scraping completed.".to_string(),
        batch_id,
        keywords: input.keywords,
        results,
    }))
}
