//! Stable error codes, client-facing wording and redacted logging for the
//! error types in [`crate::error`].

use crate::error::{ConfigError, CoreError, RedditApiError};
use crate::sanitize::sanitize_error_message;
use std::fmt::Display;
use std::time::Duration;
use tracing::{error, warn};

pub trait ErrorExt: Display {
    /// Machine-readable code, stable across releases.
    fn error_code(&self) -> &'static str;

    /// Text safe to show an end user. Never echoes tokens or upstream bodies.
    fn user_friendly_message(&self) -> String;

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn log_error(&self) -> &Self {
        error!(
            code = self.error_code(),
            "{}",
            sanitize_error_message(&self.to_string())
        );
        self
    }

    fn log_warn(&self) -> &Self {
        warn!(
            code = self.error_code(),
            "{}",
            sanitize_error_message(&self.to_string())
        );
        self
    }
}

impl ErrorExt for RedditApiError {
    fn error_code(&self) -> &'static str {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED",
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT",
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN",
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND",
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN",
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT",
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE",
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit refused the app credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => {
                format!("Reddit is rate limiting us; try again in {}s.", retry_after)
            }
            RedditApiError::Forbidden { .. } => {
                "That content is private or quarantined.".to_string()
            }
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("r/{} could not be found.", subreddit)
            }
            RedditApiError::InvalidToken => {
                "Reddit rejected the access token; the next request will use a fresh one."
                    .to_string()
            }
            RedditApiError::RequestTimeout => "Reddit took too long to answer.".to_string(),
            RedditApiError::InvalidResponse { .. } | RedditApiError::ServerError { .. } => {
                "Reddit returned something we could not use.".to_string()
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            RedditApiError::RateLimitExceeded { .. }
                | RedditApiError::RequestTimeout
                | RedditApiError::InvalidToken
                | RedditApiError::ServerError { .. }
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            RedditApiError::InvalidToken => Some(Duration::ZERO),
            other => other.backoff(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
            ConfigError::Unreadable { .. } => "CONFIG_UNREADABLE",
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => {
                format!("Server misconfigured: check '{}'.", field)
            }
            _ => "Server configuration could not be loaded.".to_string(),
        }
    }
}

impl ErrorExt for CoreError {
    fn error_code(&self) -> &'static str {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API",
            CoreError::Config(_) => "CONFIG",
            CoreError::Io(_) => "IO",
            CoreError::Network(_) => "NETWORK",
            CoreError::InvalidInput { .. } => "INVALID_INPUT",
            CoreError::UnsafePath { .. } => "UNSAFE_PATH",
            CoreError::NotFound { .. } => "NOT_FOUND",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => "Reddit is unreachable right now.".to_string(),
            CoreError::InvalidInput { message } => message.clone(),
            CoreError::UnsafePath { .. } => "That Reddit path is not allowed.".to_string(),
            CoreError::NotFound { .. } => "Nothing exists at that Reddit path.".to_string(),
            CoreError::Io(_) => {
                "Something went wrong on our side.".to_string()
            }
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::RedditApi(e) => e.retry_after(),
            _ => None,
        }
    }
}
