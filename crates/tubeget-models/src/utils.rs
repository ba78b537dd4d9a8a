//! Utility functions for duration formatting, filenames, and URL validation.
//!
//! These helpers are shared between the extraction core and the HTTP
//! handlers, so they live here rather than in either crate.

use url::Url;

/// Format a duration in whole seconds as `M:SS`.
///
/// Minutes are not capped at 59, so an hour-long video renders as
/// `60:00` rather than rolling over.
pub fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Strip a video title down to a safe filename component.
///
/// Keeps word characters, whitespace, and hyphens; everything else is
/// dropped. Falls back to `"video"` when nothing survives.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == ' ')
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Check that a string is an http(s) URL with a host.
///
/// This is the only validation performed before a URL is handed to the
/// extraction tool; whether the tool can actually extract from it is the
/// tool's business.
pub fn validate_url(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(75), "1:15");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(3600), "60:00");
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
    }

    #[test]
    fn test_sanitize_filename() {
        let sanitized = sanitize_filename("Test/Video: Best?!");
        assert_eq!(sanitized, "TestVideo Best");
        assert!(sanitized
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' '));
    }

    #[test]
    fn test_sanitize_filename_keeps_hyphens_and_underscores() {
        assert_eq!(sanitize_filename("my_clip - part 2"), "my_clip - part 2");
    }

    #[test]
    fn test_sanitize_filename_empty_falls_back() {
        assert_eq!(sanitize_filename("???!!!"), "video");
        assert_eq!(sanitize_filename(""), "video");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(validate_url("http://example.com/video"));
        assert!(validate_url("  https://youtu.be/abc  "));

        assert!(!validate_url(""));
        assert!(!validate_url("not a url"));
        assert!(!validate_url("ftp://example.com/file"));
        assert!(!validate_url("file:///etc/passwd"));
    }
}
