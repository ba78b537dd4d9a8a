//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use tubeget_extract::ExtractError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Extract(ExtractError::UnsupportedFormat(_)) => StatusCode::BAD_REQUEST,
            ApiError::Extract(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let production = std::env::var("ENVIRONMENT").unwrap_or_default() == "production";

        let body = match &self {
            ApiError::BadRequest(msg) => ErrorResponse {
                error: msg.clone(),
                details: None,
            },
            ApiError::Extract(ExtractError::UnsupportedFormat(f)) => ErrorResponse {
                error: format!("Unsupported format: {f}"),
                details: None,
            },
            ApiError::Extract(ExtractError::ResolutionExhausted { summary }) => ErrorResponse {
                error: "Failed to fetch video info. It might be restricted or private."
                    .to_string(),
                details: Some(summary.clone()),
            },
            // Internals carry no tool diagnostics; redact in production.
            _ if production => ErrorResponse {
                error: "An internal error occurred".to_string(),
                details: None,
            },
            other => ErrorResponse {
                error: "Internal Server Error".to_string(),
                details: Some(other.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::bad_request("URL is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Extract(ExtractError::UnsupportedFormat("mkv".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Extract(ExtractError::ResolutionExhausted {
                summary: "web: blocked".into()
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
