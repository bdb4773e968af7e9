use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::routes::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Hash a raw API key so comparisons never touch the key itself.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Middleware that checks the x-api-key header against the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Scrape request without API key");
            AppError::Unauthorized
        })?;

    if hash_key(presented) != *state.api_key_hash {
        tracing::warn!("Unauthorized access attempt to /scrape");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
