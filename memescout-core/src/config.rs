use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "MemeBot/1.0 by YourUsername";
pub const DEFAULT_SUBREDDIT: &str = "tarotmemes";
pub const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";
pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide settings, built once at startup and passed by reference.
///
/// Credentials stay optional here so that a missing secret is reported per
/// invocation instead of preventing the function from starting.
#[derive(Clone)]
pub struct AppConfig {
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub user_agent: String,
    pub default_subreddit: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Reads `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`, `REDDIT_USER_AGENT`
    /// and `REDDIT_SUBREDDIT` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injected variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            reddit_client_id: var("REDDIT_CLIENT_ID"),
            reddit_client_secret: var("REDDIT_CLIENT_SECRET"),
            user_agent: var("REDDIT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            default_subreddit: var("REDDIT_SUBREDDIT")
                .unwrap_or_else(|| DEFAULT_SUBREDDIT.to_string()),
            auth_base_url: REDDIT_AUTH_BASE.to_string(),
            api_base_url: REDDIT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.reddit_client_id = Some(client_id.into());
        self.reddit_client_secret = Some(client_secret.into());
        self
    }

    /// Points both the token endpoint and the search API at other hosts.
    pub fn with_base_urls(mut self, auth_base_url: &str, api_base_url: &str) -> Self {
        self.auth_base_url = auth_base_url.trim_end_matches('/').to_string();
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Client id and secret, or `MissingCredentials` if either is absent.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (&self.reddit_client_id, &self.reddit_client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("reddit_client_id", &self.reddit_client_id)
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("user_agent", &self.user_agent)
            .field("default_subreddit", &self.default_subreddit)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
