use crate::listing::{normalize_listing_value, Listing};
use crate::models::{PostData, SubredditData};
use crate::validation::{ensure_safe_reddit_path, is_valid_subreddit_name};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;
use viewer_core::{sanitize_error_message, AppConfig, CoreError, RedditApiError};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const MAX_LISTING_LIMIT: u32 = 100;
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
            Sort::Controversial => "controversial",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Sort::Hot),
            "new" => Ok(Sort::New),
            "top" => Ok(Sort::Top),
            "rising" => Ok(Sort::Rising),
            "controversial" => Ok(Sort::Controversial),
            other => Err(CoreError::InvalidInput {
                message: format!("unknown sort '{}'", other),
            }),
        }
    }
}

/// Pagination and ordering parameters for a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub sort: Option<String>,
    /// Time window for `top`/`controversial`: hour, day, week, month, year, all.
    pub t: Option<String>,
}

impl ListingQuery {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Encoded query string; absent and empty fields are omitted and `limit`
    /// is clamped to 1..=100.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.clamp(1, MAX_LISTING_LIMIT).to_string());
        }
        for (key, value) in [("after", &self.after), ("sort", &self.sort), ("t", &self.t)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// Thin client over Reddit's OAuth JSON API. Every request path is checked
/// with [`crate::is_safe_reddit_path`] before anything goes on the wire.
#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String, base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            CoreError::InvalidInput {
                message: format!("invalid API base URL '{}': {}", base_url, e),
            }
        })?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            user_agent,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(
            config.user_agent.clone(),
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Joins `path` and `query` onto the base URL, refusing unsafe paths and
    /// anything that would leave the API host.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> Result<Url, CoreError> {
        ensure_safe_reddit_path(path)?;

        let base_path = self.base_url.path().trim_end_matches('/');
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{}", base_path, path));
        url.set_query(query.filter(|q| !q.is_empty()));

        if url.host_str() != self.base_url.host_str() || url.port() != self.base_url.port() {
            return Err(CoreError::UnsafePath {
                path: path.to_string(),
            });
        }

        Ok(url)
    }

    pub async fn make_request(
        &self,
        path: &str,
        access_token: &str,
        query: Option<&str>,
    ) -> Result<Response, CoreError> {
        let url = self.build_url(path, query)?;

        info!("Making Reddit API request: GET {}", path);
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "Network error for GET {}: {}",
                    path,
                    sanitize_error_message(&e.to_string())
                );
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, path);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, path);
        Err(status_error(status, response.headers(), path))
    }

    pub async fn get_json(
        &self,
        path: &str,
        access_token: &str,
        query: Option<&str>,
    ) -> Result<Value, CoreError> {
        let response = self.make_request(path, access_token, query).await?;
        response.json().await.map_err(|e| {
            error!("Failed to parse response for {}: {}", path, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse JSON from {}", path),
            })
        })
    }

    pub async fn get_listing<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &ListingQuery,
    ) -> Result<Listing<T>, CoreError> {
        let value = self
            .get_json(path, access_token, Some(&query.to_query_string()))
            .await?;
        let listing = normalize_listing_value(&value);
        debug!("Normalized {} listing children from {}", listing.items.len(), path);
        Ok(listing)
    }

    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        sort: Sort,
        query: &ListingQuery,
    ) -> Result<Listing<PostData>, CoreError> {
        if !is_valid_subreddit_name(subreddit) {
            return Err(CoreError::InvalidInput {
                message: format!("invalid subreddit name '{}'", subreddit),
            });
        }

        let path = format!("/r/{}/{}", subreddit, sort);
        let listing = self
            .get_listing(&path, access_token, query)
            .await
            .map_err(|e| subreddit_not_found(e, subreddit))?;

        info!("Retrieved {} posts from r/{}", listing.items.len(), subreddit);
        Ok(listing)
    }

    pub async fn get_subreddit_info(
        &self,
        access_token: &str,
        subreddit: &str,
    ) -> Result<SubredditData, CoreError> {
        if !is_valid_subreddit_name(subreddit) {
            return Err(CoreError::InvalidInput {
                message: format!("invalid subreddit name '{}'", subreddit),
            });
        }

        let path = format!("/r/{}/about", subreddit);
        let value = self
            .get_json(&path, access_token, None)
            .await
            .map_err(|e| subreddit_not_found(e, subreddit))?;

        let data = value.get("data").cloned().unwrap_or(Value::Null);
        let info: SubredditData = serde_json::from_value(data).map_err(|e| {
            error!("Failed to parse subreddit info: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse info for r/{}", subreddit),
            })
        })?;

        debug!("Retrieved info for r/{}", subreddit);
        Ok(info)
    }
}

fn subreddit_not_found(error: CoreError, subreddit: &str) -> CoreError {
    match error {
        CoreError::NotFound { .. } => CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        }),
        other => other,
    }
}

fn retry_after_secs(headers: &HeaderMap) -> u64 {
    [RETRY_AFTER.as_str(), "x-ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .find(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.ceil() as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn status_error(status: StatusCode, headers: &HeaderMap, path: &str) -> CoreError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = retry_after_secs(headers);
            warn!("Rate limited, retry after {} seconds", retry_after);
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after })
        }
        StatusCode::UNAUTHORIZED => CoreError::RedditApi(RedditApiError::InvalidToken),
        StatusCode::FORBIDDEN => CoreError::RedditApi(RedditApiError::Forbidden {
            resource: path.to_string(),
        }),
        // Reddit answers unknown listings with a redirect to search
        StatusCode::NOT_FOUND | StatusCode::FOUND | StatusCode::MOVED_PERMANENTLY => {
            CoreError::NotFound {
                resource: path.to_string(),
            }
        }
        s if s.is_server_error() => CoreError::RedditApi(RedditApiError::ServerError {
            status_code: s.as_u16(),
        }),
        s => CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", s.as_u16(), path),
        }),
    }
}
