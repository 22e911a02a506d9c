//! App-only OAuth2 (client credentials) against Reddit's token endpoint.

use memescout_core::{ConfigError, CoreError, RedditApiError, REDDIT_AUTH_BASE};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthType, AuthUrl, Client as OAuthClient, ClientId, ClientSecret, HttpRequest, HttpResponse,
    RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

const AUTHORIZE_PATH: &str = "/api/v1/authorize";
const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";

#[derive(Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_base_url: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
            auth_base_url: REDDIT_AUTH_BASE.to_string(),
        }
    }

    pub fn with_auth_base_url(mut self, auth_base_url: &str) -> Self {
        self.auth_base_url = auth_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.auth_base_url, ACCESS_TOKEN_PATH)
    }
}

impl fmt::Debug for RedditOAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditOAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("auth_base_url", &self.auth_base_url)
            .finish()
    }
}

/// Opaque bearer token. Not cached; every invocation fetches its own.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Token endpoint body as Reddit sends it. Only `access_token` matters; a
/// missing or `null` one reads as empty and is rejected after parsing.
#[derive(Debug, Serialize, Deserialize)]
struct RedditTokenResponse {
    #[serde(default = "empty_access_token", deserialize_with = "lenient_access_token")]
    access_token: oauth2::AccessToken,
    #[serde(default = "bearer", deserialize_with = "lenient_token_type")]
    token_type: BasicTokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
}

impl TokenResponse<BasicTokenType> for RedditTokenResponse {
    fn access_token(&self) -> &oauth2::AccessToken {
        &self.access_token
    }

    fn token_type(&self) -> &BasicTokenType {
        &self.token_type
    }

    fn expires_in(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }

    fn refresh_token(&self) -> Option<&RefreshToken> {
        None
    }

    fn scopes(&self) -> Option<&Vec<Scope>> {
        None
    }
}

fn empty_access_token() -> oauth2::AccessToken {
    oauth2::AccessToken::new(String::new())
}

fn bearer() -> BasicTokenType {
    BasicTokenType::Bearer
}

fn lenient_access_token<'de, D>(deserializer: D) -> Result<oauth2::AccessToken, D::Error>
where
    D: Deserializer<'de>,
{
    let secret = Option::<String>::deserialize(deserializer)?;
    Ok(oauth2::AccessToken::new(secret.unwrap_or_default()))
}

fn lenient_token_type<'de, D>(deserializer: D) -> Result<BasicTokenType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BasicTokenType>::deserialize(deserializer)?.unwrap_or_else(bearer))
}

type RedditOAuthClient = OAuthClient<
    BasicErrorResponse,
    RedditTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

pub struct RedditAuthenticator {
    oauth_client: RedditOAuthClient,
    http_client: Client,
    user_agent: String,
}

impl RedditAuthenticator {
    pub fn new(config: &RedditOAuth2Config, http_client: Client) -> Result<Self, CoreError> {
        let invalid_url = |e: oauth2::url::ParseError| {
            CoreError::Config(ConfigError::InvalidValue {
                field: "auth_base_url".to_string(),
                value: format!("{} ({})", config.auth_base_url, e),
            })
        };

        let auth_url = AuthUrl::new(format!("{}{}", config.auth_base_url, AUTHORIZE_PATH))
            .map_err(invalid_url)?;
        let token_url = TokenUrl::new(config.token_url()).map_err(invalid_url)?;

        let oauth_client = RedditOAuthClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        Ok(Self {
            oauth_client,
            http_client,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Exchanges the client id and secret for a bearer token.
    ///
    /// Every failure (transport, non-2xx status, unparsable body, missing or
    /// empty `access_token`) is logged and reported as `AuthenticationFailed`.
    pub async fn request_token(&self) -> Result<AccessToken, CoreError> {
        let token_response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| {
                send_token_request(&self.http_client, &self.user_agent, request)
            })
            .await
            .map_err(|e| {
                let reason = match &e {
                    RequestTokenError::ServerResponse(response) => {
                        format!("token endpoint returned an error: {}", response)
                    }
                    RequestTokenError::Request(inner) => format!("token request failed: {}", inner),
                    RequestTokenError::Parse(inner, body) => format!(
                        "unexpected token response: {} - {}",
                        inner,
                        String::from_utf8_lossy(body)
                    ),
                    other => other.to_string(),
                };
                error!("Error getting access token: {}", reason);
                CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
            })?;

        let secret = token_response.access_token().secret();
        if secret.is_empty() {
            error!("Error: No access token in token response");
            return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: "no access token in response".to_string(),
            }));
        }

        info!("Obtained Reddit access token");
        Ok(AccessToken::new(secret.as_str()))
    }
}

async fn send_token_request(
    http_client: &Client,
    user_agent: &str,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    debug!("Requesting access token from {}", request.url);

    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .header(USER_AGENT, user_agent)
        .body(request.body)
        .send()
        .await?;

    // Any 2xx carries a token body, whatever its declared content type.
    let mut status_code = response.status();
    let mut headers = response.headers().clone();
    if status_code.is_success() {
        status_code = StatusCode::OK;
        headers.remove(CONTENT_TYPE);
    }
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
