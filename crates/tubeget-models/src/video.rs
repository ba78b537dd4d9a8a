//! Video metadata types.
//!
//! `RawMetadata` mirrors the subset of the yt-dlp `--dump-json` document
//! we care about; `VideoInfoResponse` is the public projection returned
//! by the info endpoint.

use serde::{Deserialize, Serialize};

use crate::utils::format_duration;

/// One entry from the yt-dlp `formats` array.
///
/// yt-dlp reports codec-less sides of a format as the literal string
/// `"none"`, so both the absence of the field and that sentinel mean
/// "no such track".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    /// Vertical resolution in pixels (video formats only)
    pub height: Option<u32>,
    /// Average audio bitrate in kbit/s (audio formats only)
    pub abr: Option<f64>,
    /// Video codec, `"none"` for audio-only formats
    pub vcodec: Option<String>,
    /// Audio codec, `"none"` for video-only formats
    pub acodec: Option<String>,
}

impl RawFormat {
    fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|c| c != "none")
    }

    fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|c| c != "none")
    }
}

/// Parsed yt-dlp metadata document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

impl RawMetadata {
    /// Title with a fallback for documents that omit it.
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("video")
    }

    /// Distinct vertical resolutions across video formats, best first.
    pub fn resolutions(&self) -> Vec<u32> {
        let mut heights: Vec<u32> = self
            .formats
            .iter()
            .filter(|f| f.has_video())
            .filter_map(|f| f.height)
            .filter(|h| *h > 0)
            .collect();
        heights.sort_unstable_by(|a, b| b.cmp(a));
        heights.dedup();
        heights
    }

    /// Distinct audio bitrates (kbit/s, rounded) across audio formats,
    /// best first.
    pub fn audio_bitrates(&self) -> Vec<u32> {
        let mut bitrates: Vec<u32> = self
            .formats
            .iter()
            .filter(|f| f.has_audio())
            .filter_map(|f| f.abr)
            .filter(|b| *b > 0.0)
            .map(|b| b.round() as u32)
            .collect();
        bitrates.sort_unstable_by(|a, b| b.cmp(a));
        bitrates.dedup();
        bitrates
    }
}

/// Public metadata shape returned by `POST /api/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfoResponse {
    pub title: String,
    pub thumbnail: String,
    /// Human-readable duration, `M:SS`
    pub duration: String,
    pub author: String,
    /// Containers the download endpoint accepts
    pub formats: Vec<String>,
    pub resolutions: Vec<u32>,
    pub audio_bitrates: Vec<u32>,
}

impl VideoInfoResponse {
    /// Project the raw yt-dlp document into the public shape.
    pub fn from_raw(raw: &RawMetadata) -> Self {
        Self {
            title: raw.title_or_default().to_string(),
            thumbnail: raw.thumbnail.clone().unwrap_or_default(),
            duration: format_duration(raw.duration.unwrap_or(0.0).round() as u64),
            author: raw.uploader.clone().unwrap_or_default(),
            formats: vec!["mp3".to_string(), "mp4".to_string()],
            resolutions: raw.resolutions(),
            audio_bitrates: raw.audio_bitrates(),
        }
    }
}
