use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{RecentlyScrapedCache, marker_key};
use crate::error::AppError;

/// Process-local markers. Used when no Redis URL is configured; markers do
/// not survive a restart and are not shared between replicas.
#[derive(Default)]
pub struct InMemoryScrapeCache {
    markers: Mutex<HashMap<String, Instant>>,
}

impl InMemoryScrapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Instant>>, AppError> {
        self.markers
            .lock()
            .map_err(|_| AppError::Internal("scrape marker lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecentlyScrapedCache for InMemoryScrapeCache {
    async fn was_recently_scraped(&self, keyword: &str) -> Result<bool, AppError> {
        let key = marker_key(keyword);
        let mut markers = self.lock()?;
        match markers.get(&key) {
            Some(expires_at) if *expires_at > Instant::now() => Ok(true),
            Some(_) => {
                markers.remove(&key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn mark_scraped(&self, keyword: &str, ttl_secs: u64) -> Result<(), AppError> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.lock()?.insert(marker_key(keyword), expires_at);
        Ok(())
    }
}
