pub mod api;
pub mod auth;
pub mod image;

#[cfg(test)]
mod tests;

pub use api::{RedditApiClient, RedditListing, RedditPostData};
pub use auth::{AccessToken, RedditAuthenticator, RedditOAuth2Config};
pub use image::is_image_url;

use memescout_core::{AppConfig, CoreError, ErrorExt, ImageResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Token exchange plus keyword search, sharing one HTTP client.
pub struct RedditClient {
    authenticator: RedditAuthenticator,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(
        config: RedditOAuth2Config,
        api_base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(request_timeout)
            .build()?;

        let authenticator = RedditAuthenticator::new(&config, http_client.clone())?;
        let api = RedditApiClient::new(
            http_client,
            config.user_agent.clone(),
            api_base_url.to_string(),
        );

        Ok(Self { authenticator, api })
    }

    /// Builds a client from process configuration; fails with
    /// `MissingCredentials` before any network activity.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CoreError> {
        let (client_id, client_secret) = config.credentials()?;
        let oauth_config = RedditOAuth2Config::new(
            client_id.to_string(),
            client_secret.to_string(),
            config.user_agent.clone(),
        )
        .with_auth_base_url(&config.auth_base_url);

        Self::new(oauth_config, &config.api_base_url, config.request_timeout)
    }

    pub async fn authenticate(&self) -> Result<AccessToken, CoreError> {
        self.authenticator.request_token().await
    }

    /// Searches one keyword and keeps only direct image posts.
    pub async fn search_posts(
        &self,
        access_token: &AccessToken,
        subreddit: &str,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<ImageResult>, CoreError> {
        let listing = self
            .api
            .search(access_token.secret(), subreddit, keyword, limit)
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| is_image_url(&post.url))
            .map(|post| post.into_image_result(keyword))
            .collect())
    }

    /// Like [`RedditClient::search_posts`], but a failure only costs this
    /// keyword: it is logged and an empty list comes back.
    pub async fn search_images(
        &self,
        access_token: &AccessToken,
        subreddit: &str,
        keyword: &str,
        limit: u32,
    ) -> Vec<ImageResult> {
        match self
            .search_posts(access_token, subreddit, keyword, limit)
            .await
        {
            Ok(images) => {
                info!("Keyword '{}' matched {} images", keyword, images.len());
                images
            }
            Err(e) => {
                warn!("Search for keyword '{}' failed [{}]", keyword, e.error_code());
                e.log_warn();
                Vec::new()
            }
        }
    }
}
