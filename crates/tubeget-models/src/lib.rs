//! Shared data models for the Tubeget backend.
//!
//! This crate provides Serde-serializable types for:
//! - The raw yt-dlp metadata document
//! - The public video-info response shape
//! - Duration, filename, and URL helpers

pub mod utils;
pub mod video;

// Re-export common types
pub use utils::{format_duration, sanitize_filename, validate_url};
pub use video::{RawFormat, RawMetadata, VideoInfoResponse};
