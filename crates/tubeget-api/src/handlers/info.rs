//! Video info handler.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use tubeget_models::{validate_url, VideoInfoResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub url: Option<String>,
}

/// `POST /api/info` — resolve and return video metadata.
///
/// A cache hit is served without touching the extraction tool; a miss
/// runs the full strategy fallback and populates the cache with the
/// winning result so the download path can reuse its parameters.
pub async fn get_video_info(
    State(state): State<AppState>,
    Json(request): Json<InfoRequest>,
) -> ApiResult<Json<VideoInfoResponse>> {
    let url = request.url.as_deref().unwrap_or("").trim().to_string();
    if url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    if !validate_url(&url) {
        return Err(ApiError::bad_request("Invalid URL"));
    }

    if let Some(hit) = state.cache.get(&url).await {
        debug!(url, "Serving video info from cache");
        return Ok(Json(VideoInfoResponse::from_raw(&hit.metadata)));
    }

    let resolved = state.resolver.resolve(&url).await?;
    let info = VideoInfoResponse::from_raw(&resolved.metadata);
    state.cache.put(url, resolved).await;

    Ok(Json(info))
}
