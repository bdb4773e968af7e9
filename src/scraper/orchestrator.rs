use std::sync::Arc;

use crate::cache::RecentlyScrapedCache;
use crate::error::AppError;
use crate::models::job_post::JobRecordStore;
use crate::scraper::validate::{self, Rejection};
use crate::scraper::{KeywordError, ScrapeSettings, ScrapeSummary};
use crate::search::{RawSearchResult, SearchProvider};

/// Runs scrape batches: keywords in order, results in provider order, one
/// at a time. Construct one per batch or share it; it holds no batch state.
pub struct ScrapeOrchestrator {
    cache: Arc<dyn RecentlyScrapedCache>,
    provider: Arc<dyn SearchProvider>,
    store: Arc<dyn JobRecordStore>,
    settings: ScrapeSettings,
}

impl ScrapeOrchestrator {
    pub fn new(
        cache: Arc<dyn RecentlyScrapedCache>,
        provider: Arc<dyn SearchProvider>,
        store: Arc<dyn JobRecordStore>,
        settings: ScrapeSettings,
    ) -> Self {
        Self {
            cache,
            provider,
            store,
            settings,
        }
    }

    /// Scrape every keyword and return the batch counters.
    ///
    /// Per-result failures are always counted, never returned. A keyword-level
    /// fault aborts the batch only when `isolate_keyword_failures` is off.
    pub async fn scrape(&self, keywords: &[String]) -> Result<ScrapeSummary, AppError> {
        let mut summary = ScrapeSummary::default();

        for keyword in keywords {
            match self.scrape_keyword(keyword, &mut summary).await {
                Ok(()) => {}
                Err(e) if self.settings.isolate_keyword_failures => {
                    tracing::error!("Scraping keyword '{keyword}' failed: {e}");
                    summary.failed_keywords += 1;
                    summary.errors.push(KeywordError {
                        keyword: keyword.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            added = summary.added_jobs,
            skipped = summary.skipped_jobs,
            missing_data = summary.missing_data_jobs,
            failed_saves = summary.failed_saves,
            failed_keywords = summary.failed_keywords,
            "Scrape batch finished"
        );
        Ok(summary)
    }

    async fn scrape_keyword(
        &self,
        keyword: &str,
        summary: &mut ScrapeSummary,
    ) -> Result<(), AppError> {
        if self.was_recently_scraped(keyword).await? {
            tracing::info!("Keyword '{keyword}' was scraped recently, skipping");
            summary.skipped_keywords += 1;
            return Ok(());
        }

        let results = self.provider.search(keyword).await?;
        tracing::info!("Fetched {} results for '{keyword}'", results.len());

        for raw in &results {
            self.reconcile(raw, keyword, summary).await?;
        }

        // Marked even when nothing came back, so empty keywords are throttled too
        if let Err(e) = self
            .cache
            .mark_scraped(keyword, self.settings.ttl_secs)
            .await
        {
            if !self.settings.cache_fail_open {
                return Err(e);
            }
            tracing::warn!("Could not mark '{keyword}' as scraped: {e}");
            summary.errors.push(KeywordError {
                keyword: keyword.to_string(),
                error: e.to_string(),
            });
        }
        Ok(())
    }

    async fn was_recently_scraped(&self, keyword: &str) -> Result<bool, AppError> {
        match self.cache.was_recently_scraped(keyword).await {
            Ok(recent) => Ok(recent),
            Err(e) if self.settings.cache_fail_open => {
                tracing::warn!("Cache check for '{keyword}' failed, scraping anyway: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Merge into the posting with the same link, or insert a new one.
    /// Only a failed lookup escapes; insert and merge failures are counted.
    async fn reconcile(
        &self,
        raw: &RawSearchResult,
        keyword: &str,
        summary: &mut ScrapeSummary,
    ) -> Result<(), AppError> {
        let post = match validate::normalize(raw, keyword, self.provider.name()) {
            Ok(post) => post,
            Err(Rejection::MissingData) => {
                tracing::warn!(
                    "Job missing title or link: {:?} / {:?}",
                    raw.title,
                    raw.link
                );
                summary.missing_data_jobs += 1;
                return Ok(());
            }
            Err(Rejection::Invalid(e)) => {
                tracing::warn!("Skipping invalid job: {e}");
                summary.failed_saves += 1;
                return Ok(());
            }
        };

        if let Some(existing) = self.store.find_by_link(&post.link).await? {
            match self.store.append_keyword(&existing, keyword).await {
                Ok(true) => tracing::info!(
                    "Keyword '{keyword}' appended to existing job: {}",
                    existing.link
                ),
                Ok(false) => tracing::debug!("Job already known: {}", existing.link),
                Err(e) => {
                    tracing::error!(
                        "Failed to append keyword '{keyword}' to job {}: {e}",
                        existing.link
                    );
                    summary.failed_keyword_merges += 1;
                }
            }
            summary.skipped_jobs += 1;
            return Ok(());
        }

        let link = post.link.clone();
        match self.store.insert(post).await {
            Ok(job) => {
                tracing::info!("Saved job {}: {} - {}", job.id, job.title, job.link);
                summary.added_jobs += 1;
            }
            Err(e) => {
                tracing::error!("Failed to save job {link}: {e}");
                summary.failed_saves += 1;
            }
        }
        Ok(())
    }
}
