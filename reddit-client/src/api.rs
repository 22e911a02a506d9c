use memescout_core::{CoreError, ImageResult, RedditApiError};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

/// Upper bound Reddit applies to a single search page.
pub const MAX_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct RedditListingData<T> {
    #[serde(default)]
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

impl<T> Default for RedditListingData<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            after: None,
            before: None,
            dist: None,
        }
    }
}

/// A child with no `data` (or `null`) yields `T::default()` instead of
/// failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

/// The subset of a link post the search keeps. Every field tolerates being
/// absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedditPostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permalink: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subreddit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_utc: f64,
}

impl RedditPostData {
    pub fn into_image_result(self, keyword: &str) -> ImageResult {
        ImageResult {
            title: self.title,
            url: self.url,
            permalink: format!("{}{}", REDDIT_WEB_BASE, self.permalink),
            score: self.score,
            subreddit: self.subreddit,
            author: self.author,
            created_utc: self.created_utc,
            keyword: keyword.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    user_agent: String,
    api_base_url: String,
}

impl RedditApiClient {
    pub fn new(http_client: Client, user_agent: String, api_base_url: String) -> Self {
        Self {
            http_client,
            user_agent,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base_url, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        Err(status_error(status, &response, endpoint))
    }

    /// One page of top link posts in `subreddit` matching `query`, all time.
    pub async fn search(
        &self,
        access_token: &str,
        subreddit: &str,
        query: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/search", subreddit);
        let limit_str = limit.min(MAX_PAGE_SIZE).to_string();
        let params = [
            ("q", query),
            ("restrict_sr", "true"),
            ("sort", "top"),
            ("limit", limit_str.as_str()),
            ("type", "link"),
            ("t", "all"),
        ];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]))
            .await?;

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

        let listing: RedditListing<RedditPostData> =
            serde_json::from_slice(&body).map_err(|e| {
                error!("Failed to parse search results: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse search results for r/{}", subreddit),
                })
            })?;

        info!(
            "Retrieved {} posts from r/{} for '{}'",
            listing.data.children.len(),
            subreddit,
            query
        );
        Ok(listing)
    }
}

fn status_error(status: StatusCode, response: &Response, endpoint: &str) -> CoreError {
    match status.as_u16() {
        401 => CoreError::RedditApi(RedditApiError::InvalidToken),
        403 => CoreError::RedditApi(RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        }),
        404 => CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: subreddit_from_endpoint(endpoint),
        }),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after })
        }
        code if status.is_server_error() => {
            CoreError::RedditApi(RedditApiError::ServerError { status_code: code })
        }
        code => CoreError::RequestFailed {
            message: format!("{} returned {}", endpoint, status),
            status_code: Some(code),
        },
    }
}

fn subreddit_from_endpoint(endpoint: &str) -> String {
    endpoint
        .strip_prefix("/r/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(endpoint)
        .to_string()
}
