//! Media download handler.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use tubeget_extract::{Container, StreamOpener, StreamSelection};
use tubeget_models::{sanitize_filename, validate_url};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    /// Output container, checked against the allow-list
    pub format: Option<String>,
    /// Legacy alias for `format`: "audio" or "video"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Vertical resolution cap for video downloads
    pub quality: Option<String>,
}

impl DownloadQuery {
    fn container(&self) -> ApiResult<Container> {
        if let Some(format) = self.format.as_deref() {
            return Ok(Container::parse(format)?);
        }
        match self.kind.as_deref() {
            Some("audio") => Ok(Container::Mp3),
            _ => Ok(Container::Mp4),
        }
    }
}

/// `GET /api/download` — stream media bytes as an attachment.
///
/// The winning strategy's parameters from metadata resolution are reused
/// verbatim: success is client-context-dependent, so re-deriving them
/// for the byte-stream call would reintroduce the flakiness the
/// fallback chain exists to absorb. The cache usually has them already
/// (the UI calls info first); a miss re-resolves and caches.
///
/// Once the response body has started flowing, a tool failure can only
/// surface as transport-level truncation.
pub async fn download_video(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let url = query.url.as_deref().unwrap_or("").trim().to_string();
    if url.is_empty() {
        return Err(ApiError::bad_request("Invalid URL"));
    }
    if !validate_url(&url) {
        return Err(ApiError::bad_request("Invalid URL"));
    }

    let container = query.container()?;
    let quality = query.quality.as_deref().and_then(|q| q.parse().ok());

    let (strategy, args, title) = match state.cache.get(&url).await {
        Some(hit) => (
            hit.strategy,
            hit.args,
            hit.metadata.title_or_default().to_string(),
        ),
        None => match state.resolver.resolve(&url).await {
            Ok(resolved) => {
                let title = resolved.metadata.title_or_default().to_string();
                let strategy = resolved.strategy;
                let args = resolved.args.clone();
                state.cache.put(url.clone(), resolved).await;
                (strategy, args, title)
            }
            Err(e) => {
                // Last-resort policy: a low-probability attempt with the
                // default fallback beats refusing outright.
                let (strategy, args) = state.resolver.catalog().last_resort();
                warn!(
                    url,
                    error = %e,
                    strategy,
                    "Resolution failed before streaming, using last-resort strategy"
                );
                (strategy, args, "video".to_string())
            }
        },
    };

    info!(url, strategy, ?container, "Starting media stream");

    let stdout = state
        .streamer
        .open_stream(&url, &args, StreamSelection { container, quality })?;

    let filename = format!("{}.{}", sanitize_filename(&title), container.extension());
    let body = Body::from_stream(ReaderStream::new(stdout));

    Response::builder()
        .header(header::CONTENT_TYPE, container.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(body)
        .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
}
