use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use viewer_core::{CoreError, ErrorExt, RedditApiError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Core(e) => core_status(e),
        }
    }
}

fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::InvalidInput { .. } | CoreError::UnsafePath { .. } => StatusCode::BAD_REQUEST,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::RedditApi(e) => match e {
            RedditApiError::SubredditNotFound { .. } => StatusCode::NOT_FOUND,
            RedditApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RedditApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            RedditApiError::RequestTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        },
        CoreError::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::MalformedRequest(message) => ErrorBody {
                error: "MALFORMED_REQUEST".to_string(),
                message: message.clone(),
            },
            AppError::Core(e) => {
                if status.is_server_error() {
                    e.log_error();
                } else {
                    e.log_warn();
                }
                let error = match e {
                    CoreError::RedditApi(inner) => inner.error_code(),
                    other => other.error_code(),
                }
                .to_string();
                ErrorBody {
                    error,
                    message: e.user_friendly_message(),
                }
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::Core(e) = &self {
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = e.retry_after() {
                    if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string()) {
                        response.headers_mut().insert(RETRY_AFTER, value);
                    }
                }
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unsafe_path = AppError::from(CoreError::UnsafePath {
            path: "//evil.com".to_string(),
        });
        assert_eq!(unsafe_path.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: "nope".to_string(),
        }));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let auth = AppError::from(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
            reason: "invalid_client".to_string(),
        }));
        assert_eq!(auth.status(), StatusCode::BAD_GATEWAY);

        let internal = AppError::from(CoreError::Io(std::io::Error::other("bind failed")));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            AppError::MalformedRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let error = AppError::from(CoreError::RedditApi(RedditApiError::RateLimitExceeded {
            retry_after: 12,
        }));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "12");
    }
}
