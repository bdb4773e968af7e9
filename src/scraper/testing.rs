//! In-memory collaborators for exercising the scrape pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::cache::RecentlyScrapedCache;
use crate::error::AppError;
use crate::models::job_post::{JobPost, JobRecordStore, NewJobPost};
use crate::search::{RawSearchResult, SearchProvider};

pub fn hit(title: &str, link: &str) -> RawSearchResult {
    RawSearchResult {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        snippet: None,
        ..RawSearchResult::default()
    }
}

pub struct FakeProvider {
    name: String,
    responses: HashMap<String, Result<Vec<RawSearchResult>, String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_results(mut self, keyword: &str, results: Vec<RawSearchResult>) -> Self {
        self.responses.insert(keyword.to_string(), Ok(results));
        self
    }

    pub fn with_error(mut self, keyword: &str, error: &str) -> Self {
        self.responses
            .insert(keyword.to_string(), Err(error.to_string()));
        self
    }

    pub fn calls(&self, keyword: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(keyword)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl SearchProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawSearchResult>, AppError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(keyword.to_string())
            .or_default() += 1;
        match self.responses.get(keyword) {
            Some(Ok(results)) => Ok(results.clone()),
            Some(Err(msg)) => Err(AppError::Provider(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Job store keyed by link, with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Vec<JobPost>>,
    insert_calls: AtomicUsize,
    failing_inserts: Mutex<HashSet<usize>>,
    fail_appends: AtomicBool,
    fail_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th insert call (1-based) fail.
    pub fn fail_insert_number(&self, n: usize) {
        self.failing_inserts.lock().unwrap().insert(n);
    }

    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, title: &str, link: &str, keywords: &[&str]) {
        let mut posts = self.posts.lock().unwrap();
        let id = posts.len() as i32 + 1;
        posts.push(post(
            id,
            NewJobPost {
                title: title.to_string(),
                link: link.to_string(),
                snippet: None,
                posted_time: None,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                location: None,
                source: "seed".to_string(),
                company: None,
                validated: false,
            },
        ));
    }

    pub fn find(&self, link: &str) -> Option<JobPost> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.link == link)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn post(id: i32, input: NewJobPost) -> JobPost {
    JobPost {
        id,
        title: input.title,
        snippet: input.snippet,
        link: input.link,
        posted_time: input.posted_time,
        keywords: input.keywords,
        scraped_at: Utc::now(),
        location: input.location,
        source: input.source,
        is_user_reported: false,
        company: input.company,
        validated: input.validated,
        validated_date: None,
        requirements: None,
        description: None,
        responsibilities: None,
    }
}

#[async_trait]
impl JobRecordStore for MemoryStore {
    async fn find_by_link(&self, link: &str) -> Result<Option<JobPost>, AppError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::Internal("store unreachable".to_string()));
        }
        Ok(self.find(link))
    }

    async fn append_keyword(&self, posting: &JobPost, keyword: &str) -> Result<bool, AppError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AppError::Internal("commit failed".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        let stored = posts
            .iter_mut()
            .find(|p| p.id == posting.id)
            .ok_or_else(|| AppError::Internal(format!("Job {} not found", posting.id)))?;
        if stored.keywords.iter().any(|k| k == keyword) {
            return Ok(false);
        }
        stored.keywords.push(keyword.to_string());
        Ok(true)
    }

    async fn insert(&self, input: NewJobPost) -> Result<JobPost, AppError> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_inserts.lock().unwrap().contains(&call) {
            return Err(AppError::Internal("insert failed".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.link == input.link) {
            return Err(AppError::BadRequest(format!("duplicate link {}", input.link)));
        }
        let created = post(posts.len() as i32 + 1, input);
        posts.push(created.clone());
        Ok(created)
    }
}

/// Reads succeed from an in-memory map; every write fails.
#[derive(Default)]
pub struct WriteFailingCache {
    inner: crate::cache::InMemoryScrapeCache,
}

#[async_trait]
impl RecentlyScrapedCache for WriteFailingCache {
    async fn was_recently_scraped(&self, keyword: &str) -> Result<bool, AppError> {
        self.inner.was_recently_scraped(keyword).await
    }

    async fn mark_scraped(&self, _keyword: &str, _ttl_secs: u64) -> Result<(), AppError> {
        Err(AppError::Internal("cache write rejected".to_string()))
    }
}

/// A cache whose backend is always down.
pub struct FailingCache;

#[async_trait]
impl RecentlyScrapedCache for FailingCache {
    async fn was_recently_scraped(&self, _keyword: &str) -> Result<bool, AppError> {
        Err(AppError::Internal("cache unreachable".to_string()))
    }

    async fn mark_scraped(&self, _keyword: &str, _ttl_secs: u64) -> Result<(), AppError> {
        Err(AppError::Internal("cache unreachable".to_string()))
    }
}
