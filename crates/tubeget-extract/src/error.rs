//! Error types for extraction operations.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while invoking the extraction tool.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("extraction failed: {summary}")]
    ExtractionFailed { summary: String },

    #[error("metadata parse error: {0}")]
    MalformedMetadata(#[from] serde_json::Error),

    #[error("yt-dlp timed out after {0} seconds")]
    Timeout(u64),

    #[error("all strategies exhausted: {summary}")]
    ResolutionExhausted { summary: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create an extraction failure from the tool's diagnostic output.
    pub fn extraction_failed(summary: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            summary: summary.into(),
        }
    }

    /// One-line diagnostic suitable for a failure record.
    ///
    /// The full error chain stays in the logs; this is what survives into
    /// `ResolutionExhausted` and, eventually, the HTTP response.
    pub fn summary(&self) -> String {
        match self {
            Self::ExtractionFailed { summary } => summary.clone(),
            Self::ResolutionExhausted { summary } => summary.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_tool_diagnostic() {
        let err = ExtractError::extraction_failed("ERROR: Sign in to confirm your age");
        assert_eq!(err.summary(), "ERROR: Sign in to confirm your age");
    }

    #[test]
    fn test_summary_of_timeout() {
        assert_eq!(
            ExtractError::Timeout(30).summary(),
            "yt-dlp timed out after 30 seconds"
        );
    }
}
