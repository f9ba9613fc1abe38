use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use viewer_core::Token;

/// Requests allowed on one token before a refresh is forced. Sits under
/// Reddit's 1000 requests per 10 minutes per-token allowance.
pub const MAX_REQUESTS: u32 = 950;

/// Returns true when the caller must fetch a new token before calling the API.
pub fn should_fetch_new_token(token: Option<&Token>, count: u32) -> bool {
    token.is_none() || count >= MAX_REQUESTS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCacheState {
    Empty,
    Cached,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub cached_token: Option<Token>,
    pub request_count: u32,
}

/// Holds the single current access token and the number of requests made
/// with it.
#[derive(Debug, Default)]
pub struct TokenCache {
    state: Mutex<TokenState>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write replaces whole fields, so a poisoned lock still holds
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn should_fetch_new_token(&self) -> bool {
        let state = self.lock();
        should_fetch_new_token(state.cached_token.as_ref(), state.request_count)
    }

    pub fn set_token_state(&self, token: Token, count: u32) {
        let mut state = self.lock();
        *state = TokenState {
            cached_token: Some(token),
            request_count: count,
        };
        debug!("Stored new access token, request count set to {}", count);
    }

    pub fn set_token(&self, token: Token) {
        self.set_token_state(token, 0);
    }

    /// Returns the count after incrementing.
    pub fn increment_request_count(&self) -> u32 {
        let mut state = self.lock();
        state.request_count = state.request_count.saturating_add(1);
        state.request_count
    }

    pub fn get_cached_token(&self) -> Option<Token> {
        self.lock().cached_token.clone()
    }

    pub fn get_request_count(&self) -> u32 {
        self.lock().request_count
    }

    pub fn get_state(&self) -> TokenCacheState {
        match self.lock().cached_token {
            Some(_) => TokenCacheState::Cached,
            None => TokenCacheState::Empty,
        }
    }

    pub fn snapshot(&self) -> TokenState {
        self.lock().clone()
    }

    pub fn reset_token_state(&self) {
        *self.lock() = TokenState::default();
        debug!("Token cache reset");
    }

    /// Resets the cache only while it still holds `rejected`. Returns whether
    /// it did; a token stored by a later refresh is left alone.
    pub fn invalidate_if(&self, rejected: &str) -> bool {
        let mut state = self.lock();
        let matches = state
            .cached_token
            .as_ref()
            .is_some_and(|token| token.access_token == rejected);
        if matches {
            *state = TokenState::default();
            debug!("Token cache reset after rejection");
        }
        matches
    }
}
