//! Axum HTTP API server.
//!
//! This crate provides:
//! - The `POST /api/info` and `GET /api/download` endpoints
//! - Per-IP rate limiting and CORS
//! - Environment-driven configuration

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
