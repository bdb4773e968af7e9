use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppError;

/// A persisted, deduplicated job posting. `link` is the natural key.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobPost {
    pub id: i32,
    pub title: String,
    pub snippet: Option<String>,
    pub link: String,
    pub posted_time: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub scraped_at: DateTime<Utc>,
    pub location: Option<String>,
    pub source: String,
    pub is_user_reported: bool,
    pub company: Option<String>,
    pub validated: bool,
    pub validated_date: Option<DateTime<Utc>>,
    pub requirements: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
}

/// Validated fields for a posting seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobPost {
    pub title: String,
    pub link: String,
    pub snippet: Option<String>,
    pub posted_time: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub source: String,
    pub company: Option<String>,
    pub validated: bool,
}

/// Persistence boundary used by the scrape pipeline.
///
/// Every call acquires its own transaction, so a failed insert or keyword
/// append never leaves state behind for the calls that follow it.
#[async_trait]
pub trait JobRecordStore: Send + Sync {
    async fn find_by_link(&self, link: &str) -> Result<Option<JobPost>, AppError>;

    /// Add `keyword` to the posting unless it is already present.
    /// Returns whether the keyword list changed.
    async fn append_keyword(&self, posting: &JobPost, keyword: &str) -> Result<bool, AppError>;

    /// Insert a new posting with `scraped_at` set to now.
    async fn insert(&self, input: NewJobPost) -> Result<JobPost, AppError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRecordStore for PgJobStore {
    async fn find_by_link(&self, link: &str) -> Result<Option<JobPost>, AppError> {
        let post = sqlx::query_as::<_, JobPost>("SELECT * FROM job_posts WHERE link = $1")
            .bind(link)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn append_keyword(&self, posting: &JobPost, keyword: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE job_posts SET keywords = array_append(keywords, $2) WHERE id = $1 AND NOT ($2 = ANY(keywords))",
        )
        .bind(posting.id)
        .bind(keyword)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, input: NewJobPost) -> Result<JobPost, AppError> {
        let mut tx = self.pool.begin().await?;
        let post = sqlx::query_as::<_, JobPost>(
            "INSERT INTO job_posts (title, link, snippet, posted_time, keywords, scraped_at, location, source, company, validated) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.link)
        .bind(&input.snippet)
        .bind(input.posted_time)
        .bind(&input.keywords)
        .bind(Utc::now())
        .bind(&input.location)
        .bind(&input.source)
        .bind(&input.company)
        .bind(input.validated)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(post)
    }
}
