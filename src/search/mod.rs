// Search providers turn a keyword into raw, unvalidated job results.

pub mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One unvalidated hit from a search provider. Only `title`, `link` and
/// `snippet` are interpreted; everything else rides along as metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Trait that all job search providers must implement.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Identifier stored as the `source` of every posting this provider finds.
    fn name(&self) -> &str;

    /// Fetch every result for `keyword`, in provider order. Paging and rate
    /// limiting happen inside; zero results is a normal outcome.
    async fn search(&self, keyword: &str) -> Result<Vec<RawSearchResult>, AppError>;
}
