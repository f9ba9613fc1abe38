pub mod api;
pub mod auth;
pub mod client;
pub mod format;
pub mod listing;
pub mod models;
pub mod token_cache;
pub mod validation;


pub use api::{ListingQuery, RedditApiClient, Sort};
pub use auth::{RedditOAuth2Config, TokenProvider};
pub use client::RedditClient;
pub use format::{format_time_ago, format_time_ago_at, generate_post_slug, get_medium_image};
pub use listing::{
    extract_children, extract_children_from_value, normalize_listing, normalize_listing_value,
    Listing, ListingChild, ListingData, ListingEnvelope,
};
pub use models::{CommentData, PostData, PostSummary, Resolution, SubredditData};
pub use token_cache::{should_fetch_new_token, TokenCache, TokenCacheState, MAX_REQUESTS};
pub use validation::{ensure_safe_reddit_path, is_safe_reddit_path, is_valid_subreddit_name};
pub use viewer_core::sanitize_error_message;
