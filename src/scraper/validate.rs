use url::Url;

use crate::error::AppError;
use crate::models::job_post::NewJobPost;
use crate::search::RawSearchResult;

/// Why a raw result could not become a posting.
#[derive(Debug)]
pub enum Rejection {
    /// Title or link absent or blank. Never reaches the store.
    MissingData,
    /// Present but malformed, e.g. a link that is not an http(s) URL.
    Invalid(AppError),
}

/// Turn a raw search hit into insertable fields for `keyword`.
pub fn normalize(
    raw: &RawSearchResult,
    keyword: &str,
    source: &str,
) -> Result<NewJobPost, Rejection> {
    let title = non_blank(raw.title.as_deref()).ok_or(Rejection::MissingData)?;
    let link = non_blank(raw.link.as_deref()).ok_or(Rejection::MissingData)?;
    let link = normalize_link(link).map_err(Rejection::Invalid)?;

    Ok(NewJobPost {
        title: title.to_string(),
        link,
        snippet: non_blank(raw.snippet.as_deref()).map(String::from),
        posted_time: None,
        keywords: vec![keyword.to_string()],
        location: None,
        source: source.to_string(),
        company: None,
        validated: false,
    })
}

/// Parse `link` as an absolute http(s) URL and return its canonical form,
/// the form postings are stored and looked up under.
pub fn normalize_link(link: &str) -> Result<String, AppError> {
    let url = Url::parse(link)
        .map_err(|e| AppError::Validation(format!("invalid link '{link}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "unsupported link scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::Validation(format!("link '{link}' has no host")));
    }
    Ok(url.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
