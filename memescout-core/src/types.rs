use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A post whose URL points straight at an image, tagged with the keyword
/// whose search produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub title: String,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub subreddit: String,
    pub author: String,
    pub created_utc: f64,
    pub keyword: String,
}

/// Merged output of all keyword searches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    /// Unique images found before truncation.
    pub total_found: usize,
    pub images: Vec<ImageResult>,
}

/// Body of a successful invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub keywords: String,
    pub subreddit: String,
    pub total_found: usize,
    pub images: Vec<ImageResult>,
}

/// Body of a failed invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Concatenates per-keyword batches in order, drops repeated URLs (first one
/// wins), sorts by score descending and keeps at most `limit` entries.
///
/// The sort is stable, so equal scores keep their first-seen order.
pub fn merge_results<I>(batches: I, limit: usize) -> SearchResults
where
    I: IntoIterator<Item = Vec<ImageResult>>,
{
    let mut seen_urls = HashSet::new();
    let mut images: Vec<ImageResult> = batches
        .into_iter()
        .flatten()
        .filter(|image| seen_urls.insert(image.url.clone()))
        .collect();

    images.sort_by(|a, b| b.score.cmp(&a.score));

    let total_found = images.len();
    images.truncate(limit);

    SearchResults {
        total_found,
        images,
    }
}
