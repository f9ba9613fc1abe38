use reddit_client::{RedditClient, TokenCache};
use std::sync::Arc;
use viewer_core::{AppConfig, CoreError};

pub struct State {
    pub config: AppConfig,
    pub reddit: RedditClient,
}

impl State {
    pub fn new(config: AppConfig) -> Result<Arc<Self>, CoreError> {
        Self::with_cache(config, Arc::new(TokenCache::new()))
    }

    /// Builds state around an existing token cache, so a cache can be shared
    /// or pre-seeded.
    pub fn with_cache(config: AppConfig, cache: Arc<TokenCache>) -> Result<Arc<Self>, CoreError> {
        let reddit = RedditClient::with_cache(&config, cache)?;
        Ok(Arc::new(Self { config, reddit }))
    }
}
