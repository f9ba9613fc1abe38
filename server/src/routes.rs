use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, RawQuery, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use reddit_client::{is_safe_reddit_path, ListingQuery, PostSummary, Sort};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use viewer_core::{CoreError, Token};

use crate::{error::AppError, state::State};

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn token_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<Token>, AppError> {
    let token = state.reddit.access_token().await?;
    Ok(Json(token))
}

/// `GET /api/reddit/*path`: forwards a read to the Reddit API.
pub async fn proxy_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, AppError> {
    let path = format!("/{}", path);
    if !is_safe_reddit_path(&path) {
        warn!("Rejected unsafe proxy path: {}", path);
        return Err(CoreError::UnsafePath { path }.into());
    }

    debug!("Proxying {}", path);
    let value = state.reddit.proxy_get(&path, query.as_deref()).await?;
    Ok(Json(value))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub t: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<PostSummary>,
    pub after: Option<String>,
}

/// `GET /r/:subreddit/:sort`: one page of posts flattened for rendering.
pub async fn posts_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path((subreddit, sort)): Path<(String, String)>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<PostsResponse>, AppError> {
    let Query(params) = params.map_err(|e| AppError::MalformedRequest(e.body_text()))?;
    let sort: Sort = sort.parse()?;
    let query = ListingQuery {
        limit: params.limit,
        after: params.after,
        sort: None,
        t: params.t,
    };

    let now = chrono::Utc::now().timestamp();
    let listing = state
        .reddit
        .fetch_post_summaries(&subreddit, sort, &query, now)
        .await?;

    Ok(Json(PostsResponse {
        posts: listing.items,
        after: listing.after,
    }))
}
