use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{RecentlyScrapedCache, marker_key};
use crate::error::AppError;

/// Markers stored as `SETEX scraped:<keyword> <ttl> 1`.
#[derive(Clone)]
pub struct RedisScrapeCache {
    conn: ConnectionManager,
}

impl RedisScrapeCache {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl RecentlyScrapedCache for RedisScrapeCache {
    async fn was_recently_scraped(&self, keyword: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(marker_key(keyword)).await?;
        Ok(exists)
    }

    async fn mark_scraped(&self, keyword: &str, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let _: () = conn.set_ex(marker_key(keyword), "1", ttl_secs.max(1)).await?;
        Ok(())
    }
}
