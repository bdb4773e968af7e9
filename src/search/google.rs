use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;

use crate::error::AppError;
use crate::search::{RawSearchResult, SearchProvider};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const SOURCE_NAME: &str = "job_scraper_cloud_GoogleSearch";

/// The API never returns more than this per request.
const PAGE_SIZE: usize = 10;

pub const DEFAULT_LOCATION: &str =
    r#""Israel" OR "Tel Aviv" OR "Haifa" OR "Jerusalem" OR "Herzliya" OR "Ramat Gan""#;

pub const ALLOWED_JOB_SITES: [&str; 4] = [
    "boards.greenhouse.io",
    "jobs.lever.co",
    "comeet.com",
    "workday.com",
];

/// Snippets listing "Israel, Italy" come from multi-country postings that
/// merely matched the location clause.
const FALSE_LOCATION_MARKER: &str = "israel, italy";

#[derive(Debug, Clone)]
pub struct GoogleSearchConfig {
    pub base_url: String,
    pub api_key: String,
    pub search_engine_id: String,
    pub client_id: String,
    pub location: String,
    pub max_results: usize,
    pub max_pages: usize,
    pub page_delay: RangeInclusive<Duration>,
}

impl Default for GoogleSearchConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
            search_engine_id: String::new(),
            client_id: "job-scraper".to_string(),
            location: DEFAULT_LOCATION.to_string(),
            max_results: 20,
            max_pages: 5,
            page_delay: Duration::from_secs(1)..=Duration::from_secs(3),
        }
    }
}

/// Google Custom Search restricted to a fixed set of job boards.
pub struct GoogleSearch {
    client: reqwest::Client,
    config: GoogleSearchConfig,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Option<Vec<RawSearchResult>>,
}

impl GoogleSearch {
    pub fn new(config: GoogleSearchConfig) -> Result<Self, AppError> {
        if config.api_key.is_empty()
            || config.search_engine_id.is_empty()
            || config.client_id.is_empty()
        {
            return Err(AppError::Internal(
                "Google API credentials are not set".to_string(),
            ));
        }
        if config.max_results == 0 {
            return Err(AppError::Internal(
                "Number of results must be a positive integer".to_string(),
            ));
        }
        if config.max_pages == 0 {
            return Err(AppError::Internal(
                "Number of result pages must be a positive integer".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// `site:a OR site:b ("keyword") (location)`
    pub fn build_query(&self, keyword: &str) -> String {
        let sites = ALLOWED_JOB_SITES
            .iter()
            .map(|site| format!("site:{site}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{sites} (\"{keyword}\") ({})", self.config.location)
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        num: usize,
    ) -> Result<SearchPage, AppError> {
        let num = num.to_string();
        let start = start.to_string();
        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.search_engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("start", start.as_str()),
                ("sort", "date"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Google search request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Provider(format!(
                "Google search returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse search response: {e}")))
    }

    async fn pause_between_pages(&self) {
        let delay = if self.config.page_delay.start() >= self.config.page_delay.end() {
            *self.config.page_delay.start()
        } else {
            rand::rng().random_range(self.config.page_delay.clone())
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawSearchResult>, AppError> {
        let query = self.build_query(keyword);
        let mut results = Vec::new();
        let mut start = 1;

        for page in 0..self.config.max_pages {
            if results.len() >= self.config.max_results {
                break;
            }
            if page > 0 {
                self.pause_between_pages().await;
            }

            let num = PAGE_SIZE.min(self.config.max_results - results.len());
            let Some(items) = self.fetch_page(&query, start, num).await?.items else {
                if page == 0 {
                    tracing::info!("No results found for '{keyword}'");
                }
                break;
            };

            results.extend(items.into_iter().filter(is_location_plausible));
            start += PAGE_SIZE;
        }

        results.truncate(self.config.max_results);
        tracing::debug!("Google search for '{keyword}' returned {} results", results.len());
        Ok(results)
    }
}

fn is_location_plausible(result: &RawSearchResult) -> bool {
    !result
        .snippet
        .as_deref()
        .unwrap_or_default()
        .to_lowercase()
        .contains(FALSE_LOCATION_MARKER)
}
