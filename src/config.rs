use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::scraper::ScrapeSettings;
use crate::search::google::{DEFAULT_LOCATION, GoogleSearchConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "jobscraper", about = "Keyword-driven job posting scraper")]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true", action = ArgAction::Set)]
    pub run_migrations: bool,

    /// Redis URL for the recently-scraped markers. Falls back to an
    /// in-process cache when unset.
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// How long a keyword stays "recently scraped", in seconds
    #[arg(long, env = "SCRAPE_TTL_SECS", default_value = "14400")]
    pub scrape_ttl_secs: u64,

    /// Keep going with the next keyword when one keyword's fetch fails
    #[arg(long, env = "ISOLATE_KEYWORD_FAILURES", default_value = "true", action = ArgAction::Set)]
    pub isolate_keyword_failures: bool,

    /// Treat an unreachable cache as "not recently scraped"
    #[arg(long, env = "CACHE_FAIL_OPEN", default_value = "true", action = ArgAction::Set)]
    pub cache_fail_open: bool,

    #[arg(long, env = "GOOGLE_API_KEY")]
    pub google_api_key: String,

    #[arg(long, env = "GOOGLE_SEARCH_ENGINE_ID")]
    pub google_search_engine_id: String,

    #[arg(long, env = "CLIENT_ID", default_value = "job-scraper")]
    pub client_id: String,

    /// Maximum results collected per keyword
    #[arg(long, env = "SEARCH_MAX_RESULTS", default_value = "20")]
    pub search_max_results: usize,

    /// Maximum result pages requested per keyword
    #[arg(long, env = "SEARCH_MAX_PAGES", default_value = "5")]
    pub search_max_pages: usize,

    /// Location clause appended to every query
    #[arg(long, env = "SEARCH_LOCATION", default_value = DEFAULT_LOCATION)]
    pub search_location: String,

    #[arg(long, env = "SEARCH_PAGE_DELAY_MIN_MS", default_value = "1000")]
    pub search_page_delay_min_ms: u64,

    #[arg(long, env = "SEARCH_PAGE_DELAY_MAX_MS", default_value = "3000")]
    pub search_page_delay_max_ms: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,

        /// Key expected in the x-api-key header of scrape requests
        #[arg(long, env = "SCRAPER_API_KEY")]
        api_key: String,
    },
    /// Run a single scrape batch and print the summary
    Scrape {
        /// Keyword to scrape (repeatable)
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
    },
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> anyhow::Result<Command> {
        if let Some(command) = &self.command {
            return Ok(command.clone());
        }
        let api_key = std::env::var("SCRAPER_API_KEY")
            .map_err(|_| anyhow::anyhow!("SCRAPER_API_KEY must be set to serve"))?;
        Ok(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api_key,
        })
    }

    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            ttl_secs: self.scrape_ttl_secs,
            isolate_keyword_failures: self.isolate_keyword_failures,
            cache_fail_open: self.cache_fail_open,
        }
    }

    pub fn google_search(&self) -> GoogleSearchConfig {
        let min = self.search_page_delay_min_ms;
        let max = self.search_page_delay_max_ms.max(min);
        GoogleSearchConfig {
            api_key: self.google_api_key.clone(),
            search_engine_id: self.google_search_engine_id.clone(),
            client_id: self.client_id.clone(),
            location: self.search_location.clone(),
            max_results: self.search_max_results,
            max_pages: self.search_max_pages,
            page_delay: Duration::from_millis(min)..=Duration::from_millis(max),
            ..GoogleSearchConfig::default()
        }
    }
}
