//! HTTP front for the Reddit viewer.
//!
//! # Routes
//! - `GET /health` liveness check
//! - `GET /api/token` current application access token, refreshed on demand
//! - `GET /api/reddit/*path` read-only proxy to the Reddit OAuth API; the path
//!   must be a rooted API path (no `..`, no `//host`, no scheme, no fragment)
//! - `GET /r/:subreddit/:sort` one page of posts flattened for rendering,
//!   with `limit`, `after` and `t` query parameters
//!
//! # Exposing the token
//! `/api/token` is served to any origin. The token comes from an app-only
//! client-credentials grant limited to the configured scopes (`read` by
//! default): it carries no user identity and cannot post, vote or read
//! private data. It grants nothing beyond what the proxy route already
//! offers. Deployments that widen `scopes` should drop the route or narrow
//! the CORS origin.
//!
//! # Token budget
//! One application token is shared by every request. It is replaced after
//! 950 upstream requests, or when Reddit answers 401 for that same token.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use viewer_core::{AppConfig, CoreError};

pub mod error;
pub mod routes;
pub mod state;

use routes::{health_handler, posts_handler, proxy_handler, token_handler};
use state::State;

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/token", get(token_handler))
        .route("/api/reddit/*path", get(proxy_handler))
        .route("/r/:subreddit/:sort", get(posts_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<(), CoreError> {
    info!("Initializing state...");
    let state = State::new(config)?;
    let address = state.config.socket_address();

    info!("Starting server...");
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
