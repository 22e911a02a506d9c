#[cfg(test)]
mod tests {
    use crate::{AccessToken, RedditClient, RedditOAuth2Config};
    use memescout_core::{AppConfig, CoreError, RedditApiError};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{
        basic_auth, bearer_token, body_string_contains, header, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_USER_AGENT: &str = "memescout/1.0 by test_user";

    fn create_test_config() -> RedditOAuth2Config {
        RedditOAuth2Config::new(
            "test_client_id".to_string(),
            "test_client_secret".to_string(),
            TEST_USER_AGENT.to_string(),
        )
    }

    fn app_config_for(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default()
            .with_credentials("test_client_id", "test_client_secret")
            .with_base_urls(&server.uri(), &server.uri());
        config.user_agent = TEST_USER_AGENT.to_string();
        config
    }

    fn client_for(server: &MockServer) -> RedditClient {
        RedditClient::from_app_config(&app_config_for(server)).expect("client should build")
    }

    fn post(title: &str, url: &str, score: i64) -> serde_json::Value {
        json!({
            "kind": "t3",
            "data": {
                "title": title,
                "url": url,
                "permalink": format!("/r/tarotmemes/comments/{}/", score),
                "score": score,
                "subreddit": "tarotmemes",
                "author": "reader",
                "created_utc": 1700000000.0
            }
        })
    }

    fn listing(children: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"kind": "Listing", "data": {"children": children, "after": null}})
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test_token",
                "token_type": "bearer",
                "expires_in": 86400,
                "scope": "*"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_config_creation() {
        let config = create_test_config();
        assert_eq!(config.client_id, "test_client_id");
        assert_eq!(config.client_secret, "test_client_secret");
        assert_eq!(config.user_agent, TEST_USER_AGENT);
        assert_eq!(
            config.token_url(),
            "https://www.reddit.com/api/v1/access_token"
        );

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test_client_secret"));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("very-secret-token");
        assert_eq!(token.secret(), "very-secret-token");
        assert!(!format!("{:?}", token).contains("very-secret-token"));
    }

    #[test]
    fn test_missing_credentials_rejected_before_network() {
        let config = AppConfig::default();
        let result = RedditClient::from_app_config(&config);
        assert!(matches!(
            result,
            Err(CoreError::Config(memescout_core::ConfigError::MissingCredentials))
        ));
    }

    #[test]
    fn test_invalid_auth_base_url() {
        let config = create_test_config().with_auth_base_url("not a url");
        let result = RedditClient::new(config, "https://oauth.reddit.com", Duration::from_secs(1));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_token_request_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(basic_auth("test_client_id", "test_client_secret"))
            .and(header("user-agent", TEST_USER_AGENT))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh_token",
                "token_type": "bearer",
                "expires_in": 86400,
                "scope": "*"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).authenticate().await.expect("token");
        assert_eq!(token.secret(), "fresh_token");
    }

    #[tokio::test]
    async fn test_token_response_without_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "bearer",
                "expires_in": 86400
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).authenticate().await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_token_response_with_only_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).authenticate().await.expect("token");
        assert_eq!(token.secret(), "t");
    }

    #[tokio::test]
    async fn test_token_response_with_plain_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    r#"{"access_token": "plain", "token_type": "bearer"}"#,
                    "text/plain",
                ),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).authenticate().await.expect("token");
        assert_eq!(token.secret(), "plain");
    }

    #[tokio::test]
    async fn test_token_response_with_null_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": null})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).authenticate().await;
        if let Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) = result {
            assert_eq!(reason, "no access token in response");
        } else {
            panic!("Expected AuthenticationFailed error");
        }
    }

    #[tokio::test]
    async fn test_token_response_with_empty_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).authenticate().await;
        if let Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) = result {
            assert_eq!(reason, "no access token in response");
        } else {
            panic!("Expected AuthenticationFailed error");
        }
    }

    #[tokio::test]
    async fn test_token_rejected_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"message": "Unauthorized", "error": 401})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).authenticate().await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
        ));
    }

    #[test]
    fn test_token_endpoint_unreachable() {
        let config = create_test_config().with_auth_base_url("http://127.0.0.1:9");
        let client = RedditClient::new(config, "http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client should build");

        let result = tokio_test::block_on(client.authenticate());
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_search_request_format_and_filtering() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .and(bearer_token("test_token"))
            .and(header("user-agent", TEST_USER_AGENT))
            .and(query_param("q", "the fool"))
            .and(query_param("restrict_sr", "true"))
            .and(query_param("sort", "top"))
            .and(query_param("limit", "25"))
            .and(query_param("type", "link"))
            .and(query_param("t", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
                post("direct", "https://i.redd.it/fool.jpg", 120),
                post("album", "https://imgur.com/a/abc123", 90),
                post("discussion", "https://www.reddit.com/r/tarotmemes/comments/x/", 80),
                post("hosted", "https://i.redd.it/noext", 10),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = AccessToken::new("test_token");
        let images = client
            .search_posts(&token, "tarotmemes", "the fool", 40)
            .await
            .expect("search should succeed");

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].title, "direct");
        assert_eq!(images[0].keyword, "the fool");
        assert_eq!(
            images[0].permalink,
            "https://www.reddit.com/r/tarotmemes/comments/120/"
        );
        assert_eq!(images[1].url, "https://i.redd.it/noext");
    }

    #[tokio::test]
    async fn test_search_skips_child_without_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
                json!({"kind": "t3"}),
                json!({"kind": "t3", "data": null}),
                json!({"kind": "t3", "data": {"url": "https://i.redd.it/a.jpg", "score": 5}}),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let images = client_for(&server)
            .search_posts(&AccessToken::new("test_token"), "tarotmemes", "cats", 10)
            .await
            .expect("search should succeed");

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://i.redd.it/a.jpg");
        assert_eq!(images[0].score, 5);
        assert_eq!(images[0].title, "");
    }

    #[tokio::test]
    async fn test_search_small_limit_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/memes/search"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
            .expect(1)
            .mount(&server)
            .await;

        let images = client_for(&server)
            .search_posts(&AccessToken::new("test_token"), "memes", "cats", 3)
            .await
            .expect("search should succeed");
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_search_status_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/broken/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/missing/search"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/busy/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = AccessToken::new("test_token");

        let result = client.search_posts(&token, "broken", "cats", 10).await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 }))
        ));

        let result = client.search_posts(&token, "missing", "cats", 10).await;
        if let Err(CoreError::RedditApi(RedditApiError::SubredditNotFound { subreddit })) = result {
            assert_eq!(subreddit, "missing");
        } else {
            panic!("Expected SubredditNotFound error");
        }

        let result = client.search_posts(&token, "busy", "cats", 10).await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 30 }))
        ));
    }

    #[tokio::test]
    async fn test_search_unparsable_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .search_posts(&AccessToken::new("test_token"), "tarotmemes", "cats", 10)
            .await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
        ));
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing(vec![]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = app_config_for(&server).with_request_timeout(Duration::from_millis(200));
        let client = RedditClient::from_app_config(&config).expect("client should build");

        let result = client
            .search_posts(&AccessToken::new("test_token"), "tarotmemes", "cats", 10)
            .await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::RequestTimeout))
        ));
    }

    #[tokio::test]
    async fn test_search_images_isolates_failures() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .and(query_param("q", "bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/tarotmemes/search"))
            .and(query_param("q", "good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![post(
                "ok",
                "https://i.imgur.com/ok.png",
                5,
            )])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = client.authenticate().await.expect("token");
        assert_eq!(token.secret(), "test_token");

        let failed = client.search_images(&token, "tarotmemes", "bad", 10).await;
        assert!(failed.is_empty());

        let found = client.search_images(&token, "tarotmemes", "good", 10).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword, "good");
    }
}
