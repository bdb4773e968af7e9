// Scrape pipeline: throttle check, provider fetch, validation and
// link-keyed reconciliation against the job store.

mod orchestrator;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

use serde::Serialize;

pub use orchestrator::ScrapeOrchestrator;

/// Per-batch policy, built once from `Config` at startup.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Lifetime of a keyword's throttle marker.
    pub ttl_secs: u64,
    /// Record a failing keyword and move on instead of aborting the batch.
    pub isolate_keyword_failures: bool,
    /// Treat cache faults as "not recently scraped" instead of failing the keyword.
    pub cache_fail_open: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 14400,
            isolate_keyword_failures: true,
            cache_fail_open: true,
        }
    }
}

/// Batch-scoped outcome counters. Every call starts from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    /// New postings inserted.
    pub added_jobs: u32,
    /// Results whose link already existed; the keyword was merged instead.
    pub skipped_jobs: u32,
    /// Results without a title or link.
    pub missing_data_jobs: u32,
    /// Results that failed validation or whose insert failed.
    pub failed_saves: u32,
    /// Keyword merges into existing postings that failed to commit.
    pub failed_keyword_merges: u32,
    /// Keywords skipped because they were scraped recently.
    pub skipped_keywords: u32,
    /// Keywords abandoned after a provider, store or cache fault.
    pub failed_keywords: u32,
    pub errors: Vec<KeywordError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordError {
    pub keyword: String,
    pub error: String,
}
