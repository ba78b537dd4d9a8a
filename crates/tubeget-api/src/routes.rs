//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::download::download_video;
use crate::handlers::health::health;
use crate::handlers::info::get_video_info;
use crate::middleware::{cors_layer, rate_limit_middleware, request_logging, RateLimiterCache};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .route("/info", post(get_video_info))
        .route("/download", get(download_video))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
