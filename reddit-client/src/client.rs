use crate::api::{ListingQuery, RedditApiClient, Sort};
use crate::auth::{RedditOAuth2Config, TokenProvider};
use crate::listing::Listing;
use crate::models::{PostData, PostSummary, SubredditData};
use crate::token_cache::TokenCache;
use crate::validation::{ensure_safe_reddit_path, is_valid_subreddit_name};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use viewer_core::{AppConfig, CoreError, RedditApiError, Token};

/// Token management plus API access: the entry point request handlers use.
#[derive(Debug)]
pub struct RedditClient {
    tokens: TokenProvider,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        Self::with_cache(config, Arc::new(TokenCache::new()))
    }

    pub fn with_cache(config: &AppConfig, cache: Arc<TokenCache>) -> Result<Self, CoreError> {
        let oauth_config = RedditOAuth2Config::from_app_config(config)?;
        Ok(Self {
            tokens: TokenProvider::new(oauth_config, cache)?,
            api: RedditApiClient::from_config(config)?,
        })
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        self.tokens.cache()
    }

    pub async fn access_token(&self) -> Result<Token, CoreError> {
        self.tokens.access_token().await
    }

    /// Runs one authenticated upstream call: obtains a token, counts the
    /// request against it, and drops the token if Reddit rejects it.
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, CoreError>
    where
        F: FnOnce(Token) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let token = self.tokens.access_token().await?;
        let count = self.tokens.record_request();
        debug!("Upstream request #{} on current token", count);

        let used = token.access_token.clone();
        let result = call(token).await;
        if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
            warn!("Reddit rejected the cached access token");
            self.tokens.invalidate(&used);
        }
        result
    }

    /// Forwards `GET <path>?<query>` to the API and returns the JSON as-is.
    pub async fn proxy_get(&self, path: &str, query: Option<&str>) -> Result<Value, CoreError> {
        // Reject before spending a token on it
        ensure_safe_reddit_path(path)?;
        self.authorized(|token| async move {
            self.api.get_json(path, &token.access_token, query).await
        })
        .await
    }

    pub async fn fetch_listing<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &ListingQuery,
    ) -> Result<Listing<T>, CoreError> {
        ensure_safe_reddit_path(path)?;
        self.authorized(|token| async move {
            self.api.get_listing(path, &token.access_token, query).await
        })
        .await
    }

    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        sort: Sort,
        query: &ListingQuery,
    ) -> Result<Listing<PostData>, CoreError> {
        ensure_valid_subreddit(subreddit)?;
        self.authorized(|token| async move {
            self.api
                .get_subreddit_posts(&token.access_token, subreddit, sort, query)
                .await
        })
        .await
    }

    /// Posts flattened for rendering, with relative times computed at `now`.
    pub async fn fetch_post_summaries(
        &self,
        subreddit: &str,
        sort: Sort,
        query: &ListingQuery,
        now: i64,
    ) -> Result<Listing<PostSummary>, CoreError> {
        let listing = self.fetch_posts(subreddit, sort, query).await?;
        Ok(listing.map(|post| PostSummary::from_post(post, now)))
    }

    pub async fn fetch_subreddit_info(&self, subreddit: &str) -> Result<SubredditData, CoreError> {
        ensure_valid_subreddit(subreddit)?;
        self.authorized(|token| async move {
            self.api
                .get_subreddit_info(&token.access_token, subreddit)
                .await
        })
        .await
    }
}

fn ensure_valid_subreddit(subreddit: &str) -> Result<(), CoreError> {
    if is_valid_subreddit_name(subreddit) {
        Ok(())
    } else {
        Err(CoreError::InvalidInput {
            message: format!("invalid subreddit name '{}'", subreddit),
        })
    }
}
