//! Invocation boundary: raw event in, `{statusCode, body}` out.

use memescout_core::{
    merge_results, AppConfig, ConfigError, CoreError, ErrorBody, ErrorExt, RedditApiError,
    SearchRequest, SearchResponse,
};
use reddit_client::RedditClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

const FALLBACK_BODY: &str =
    r#"{"error":"Failed to serialize response","message":"Internal server error"}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self { status_code, body },
            Err(e) => {
                CoreError::from(e).log_error();
                Self {
                    status_code: 500,
                    body: FALLBACK_BODY.to_string(),
                }
            }
        }
    }
}

/// Runs one search invocation. Never fails: every error becomes a 400 or
/// 500 envelope.
pub async fn handle_event(config: &AppConfig, event: Value) -> HandlerResponse {
    match run_search(config, &event).await {
        Ok(response) => {
            info!(
                "Returning {} of {} images for '{}'",
                response.images.len(),
                response.total_found,
                response.keywords
            );
            HandlerResponse::json(200, &response)
        }
        Err(e) => error_response(&e),
    }
}

async fn run_search(config: &AppConfig, event: &Value) -> Result<SearchResponse, CoreError> {
    config.credentials()?;

    let request = SearchRequest::from_event(event, &config.default_subreddit)?;
    info!(
        "Searching r/{} for {} keywords (limit {})",
        request.subreddit,
        request.keywords.len(),
        request.limit
    );

    let client = RedditClient::from_app_config(config)?;
    let token = client.authenticate().await?;

    let mut batches = Vec::with_capacity(request.keywords.len());
    for keyword in &request.keywords {
        let images = client
            .search_images(&token, &request.subreddit, keyword, request.page_size())
            .await;
        batches.push(images);
    }

    let results = merge_results(batches, request.limit);

    Ok(SearchResponse {
        keywords: request.raw_keywords,
        subreddit: request.subreddit,
        total_found: results.total_found,
        images: results.images,
    })
}

fn error_response(error: &CoreError) -> HandlerResponse {
    let body = match error {
        CoreError::MissingKeywords => {
            warn!("Rejected invocation without keywords");
            ErrorBody::new(error.to_string(), error.user_friendly_message())
        }
        CoreError::Config(config_error @ ConfigError::MissingCredentials) => {
            error.log_error();
            ErrorBody::new(config_error.to_string(), config_error.user_friendly_message())
        }
        CoreError::RedditApi(api_error @ RedditApiError::AuthenticationFailed { .. }) => {
            error.log_error();
            ErrorBody::new(
                "Failed to authenticate with Reddit API",
                api_error.user_friendly_message(),
            )
        }
        other => {
            other.log_error();
            ErrorBody::new(other.to_string(), other.user_friendly_message())
        }
    };

    HandlerResponse::json(error.status_code(), &body)
}
