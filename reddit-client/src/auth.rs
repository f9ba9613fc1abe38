use crate::token_cache::{should_fetch_new_token, TokenCache};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError, Scope,
    TokenResponse, TokenUrl,
};
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use viewer_core::{
    sanitize_error_message, AppConfig, ConfigError, CoreError, RedditApiError, Token,
};

const DEFAULT_EXPIRES_IN: u64 = 3600;

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_agent: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
}

impl RedditOAuth2Config {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let client_id = config
            .reddit_client_id
            .clone()
            .ok_or_else(|| ConfigError::MissingField {
                field: "reddit_client_id".to_string(),
            })?;
        let client_secret =
            config
                .reddit_client_secret
                .clone()
                .ok_or_else(|| ConfigError::MissingField {
                    field: "reddit_client_secret".to_string(),
                })?;

        Ok(Self {
            client_id,
            client_secret,
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            user_agent: config.user_agent.clone(),
            scopes: config.scopes.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}

/// Obtains application-only access tokens and keeps them in a shared
/// [`TokenCache`].
///
/// Refreshes are single-flight: concurrent callers that all find the cache
/// exhausted wait on one exchange instead of each performing their own.
#[derive(Debug)]
pub struct TokenProvider {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
    cache: Arc<TokenCache>,
    refresh_lock: Mutex<()>,
}

impl TokenProvider {
    pub fn new(config: RedditOAuth2Config, cache: Arc<TokenCache>) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(config.auth_url.clone()).map_err(|_| {
            ConfigError::InvalidValue {
                field: "auth_url".to_string(),
                value: config.auth_url.clone(),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url.clone()).map_err(|_| {
            ConfigError::InvalidValue {
                field: "token_url".to_string(),
                value: config.token_url.clone(),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            auth_url,
            Some(token_url),
        );

        // Token responses are never followed across redirects.
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            oauth_client,
            http_client,
            scopes: config.scopes,
            cache,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Performs a client-credentials exchange. Does not touch the cache.
    pub async fn fetch_token(&self) -> Result<Token, CoreError> {
        info!("Requesting new Reddit access token");

        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .request_async(|request| send_token_request(http_client, request))
            .await
            .map_err(|e| {
                let reason = match &e {
                    RequestTokenError::ServerResponse(response) => response.to_string(),
                    other => other.to_string(),
                };
                let reason = sanitize_error_message(&reason);
                error!("Token exchange failed: {}", reason);
                CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
            })?;

        let token_type = serde_json::to_value(response.token_type())
            .ok()
            .and_then(|value| value.as_str().map(str::to_lowercase))
            .unwrap_or_else(|| "bearer".to_string());

        let scope = response
            .scopes()
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|scope| scope.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let token = Token {
            access_token: response.access_token().secret().clone(),
            token_type,
            expires_in: response
                .expires_in()
                .map(|d| d.as_secs())
                .unwrap_or(DEFAULT_EXPIRES_IN),
            scope,
        };

        debug!(
            "Received {} token valid for {}s with scope '{}'",
            token.token_type, token.expires_in, token.scope
        );
        Ok(token)
    }

    fn cached_if_usable(&self) -> Option<Token> {
        let state = self.cache.snapshot();
        if should_fetch_new_token(state.cached_token.as_ref(), state.request_count) {
            None
        } else {
            state.cached_token
        }
    }

    /// Returns a usable token, exchanging for a new one when the cache is
    /// empty or the request budget is spent.
    pub async fn access_token(&self) -> Result<Token, CoreError> {
        if let Some(token) = self.cached_if_usable() {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached_if_usable() {
            debug!("Token refreshed by a concurrent request");
            return Ok(token);
        }

        let token = self.fetch_token().await?;
        self.cache.set_token(token.clone());
        info!("Cached new Reddit access token");
        Ok(token)
    }

    /// Counts one upstream request against the current token.
    pub fn record_request(&self) -> u32 {
        self.cache.increment_request_count()
    }

    /// Drops `rejected` from the cache so the next call exchanges a new
    /// token. A newer token cached in the meantime is kept.
    pub fn invalidate(&self, rejected: &str) -> bool {
        let dropped = self.cache.invalidate_if(rejected);
        if dropped {
            info!("Invalidated cached Reddit access token");
        } else {
            debug!("Rejected token already replaced, keeping the cached one");
        }
        dropped
    }
}

async fn send_token_request(
    client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RedditOAuth2Config {
        RedditOAuth2Config {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "https://www.reddit.com/api/v1/authorize".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            user_agent: "reddit-viewer-test/1.0".to_string(),
            scopes: vec!["read".to_string()],
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_config_from_app_config() {
        let app_config = AppConfig {
            reddit_client_id: Some("id".to_string()),
            reddit_client_secret: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let oauth_config = RedditOAuth2Config::from_app_config(&app_config).unwrap();
        assert_eq!(oauth_config.client_id, "id");
        assert_eq!(oauth_config.scopes, vec!["read".to_string()]);
        assert_eq!(oauth_config.timeout, Duration::from_secs(30));

        let missing = RedditOAuth2Config::from_app_config(&AppConfig::default());
        assert!(matches!(missing, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_invalid_token_url() {
        let mut config = config();
        config.token_url = "not a url".to_string();
        let result = TokenProvider::new(config, Arc::new(TokenCache::new()));
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { field, .. })) if field == "token_url"
        ));
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let cache = Arc::new(TokenCache::new());
        cache.set_token(Token::new("cached"));
        let provider = TokenProvider::new(config(), Arc::clone(&cache)).unwrap();

        // No exchange happens: the token URL is never contacted.
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.access_token, "cached");
    }

    #[test]
    fn test_record_and_invalidate() {
        let cache = Arc::new(TokenCache::new());
        cache.set_token(Token::new("cached"));
        let provider = TokenProvider::new(config(), Arc::clone(&cache)).unwrap();

        assert_eq!(provider.record_request(), 1);
        assert_eq!(provider.record_request(), 2);
        assert!(!provider.invalidate("someone-else"));
        assert_eq!(cache.get_request_count(), 2);

        assert!(provider.invalidate("cached"));
        assert!(cache.get_cached_token().is_none());
        assert_eq!(cache.get_request_count(), 0);
    }
}
