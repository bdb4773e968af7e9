//! Throttle markers recording which keywords were scraped recently.
//!
//! A marker lives under `scraped:<keyword>` until its TTL runs out. The
//! check-then-mark sequence in the scrape pipeline is not atomic: two
//! batches racing on the same keyword can both see "not scraped".

mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::AppError;

pub use memory::InMemoryScrapeCache;
pub use redis_store::RedisScrapeCache;

const KEY_PREFIX: &str = "scraped";

#[async_trait]
pub trait RecentlyScrapedCache: Send + Sync {
    /// True iff an unexpired marker exists for `keyword`.
    async fn was_recently_scraped(&self, keyword: &str) -> Result<bool, AppError>;

    /// Set or refresh the marker for `keyword`, replacing any existing one.
    async fn mark_scraped(&self, keyword: &str, ttl_secs: u64) -> Result<(), AppError>;
}

fn marker_key(keyword: &str) -> String {
    format!("{KEY_PREFIX}:{keyword}")
}
