use serde::{Deserialize, Serialize};

/// OAuth bearer token as issued by Reddit's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, as reported by the provider.
    pub expires_in: u64,
    pub scope: String,
}

impl Token {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            scope: "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub user_agent: String,
    pub bind_address: String,
    pub port: u16,
    pub api_base_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub scopes: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reddit_client_id: None,
            reddit_client_secret: None,
            user_agent: "reddit-viewer/0.1".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            api_base_url: "https://oauth.reddit.com".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            auth_url: "https://www.reddit.com/api/v1/authorize".to_string(),
            scopes: vec!["read".to_string()],
            request_timeout_secs: 30,
        }
    }
}
