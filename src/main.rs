mod auth;
mod cache;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod scraper;
mod search;

#[cfg(test)]
mod test_infra;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use crate::cache::{InMemoryScrapeCache, RecentlyScrapedCache, RedisScrapeCache};
use crate::config::{Command, Config};
use crate::models::job_post::PgJobStore;
use crate::scraper::ScrapeOrchestrator;
use crate::search::google::GoogleSearch;

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(pool: PgPool) -> impl IntoResponse {
    let result: Result<(i32,), _> = sqlx::query_as("SELECT 1").fetch_one(&pool).await;
    match result {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobscraper=info,tower_http=info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn connect_cache(config: &Config) -> anyhow::Result<Arc<dyn RecentlyScrapedCache>> {
    match &config.redis_url {
        Some(url) => {
            tracing::info!("Connecting to Redis...");
            Ok(Arc::new(RedisScrapeCache::connect(url).await?))
        }
        None => {
            tracing::warn!("REDIS_URL not set, keeping scrape markers in memory");
            Ok(Arc::new(InMemoryScrapeCache::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    let command = config.resolved_command()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations complete");
    }

    let cache = connect_cache(&config).await?;
    let provider = Arc::new(GoogleSearch::new(config.google_search())?);
    let store = Arc::new(PgJobStore::new(pool.clone()));
    let orchestrator = ScrapeOrchestrator::new(cache, provider, store, config.scrape_settings());

    match command {
        Command::Serve {
            listen_addr,
            api_key,
        } => {
            let readyz_pool = pool;
            let app = Router::new()
                .route("/healthz", get(healthz))
                .route("/readyz", get(move || readyz(readyz_pool.clone())))
                .merge(routes::router(routes::AppState::new(orchestrator, &api_key)))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive());

            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            axum::serve(listener, app).await?;
        }
        Command::Scrape { keywords } => {
            let batch_id = uuid::Uuid::new_v4();
            let summary = orchestrator
                .scrape(&keywords)
                .instrument(tracing::info_span!("scrape_batch", %batch_id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
