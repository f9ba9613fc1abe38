use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the viewer backend.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("reddit: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("http transport failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("bad request: {message}")]
    InvalidInput { message: String },

    #[error("refusing to proxy path '{path}'")]
    UnsafePath { path: String },

    #[error("{resource} does not exist upstream")]
    NotFound { resource: String },
}

/// Failures reported by Reddit itself, after a response (or its absence)
/// has been classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedditApiError {
    #[error("token exchange rejected: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("request budget exhausted upstream, retry in {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },

    #[error("access to {resource} denied")]
    Forbidden { resource: String },

    #[error("r/{subreddit} is missing, banned or private")]
    SubredditNotFound { subreddit: String },

    #[error("access token rejected")]
    InvalidToken,

    #[error("no response before the deadline")]
    RequestTimeout,

    #[error("unexpected payload: {details}")]
    InvalidResponse { details: String },

    #[error("upstream answered {status_code}")]
    ServerError { status_code: u16 },
}

impl RedditApiError {
    /// How long Reddit asked us to back off, when it said so.
    pub fn backoff(&self) -> Option<Duration> {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no config file at {path}")]
    FileNotFound { path: String },

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("{field} must be set")]
    MissingField { field: String },

    #[error("{field} has unusable value '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
