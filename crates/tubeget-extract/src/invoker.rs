//! yt-dlp subprocess boundary.
//!
//! Two modes: a metadata dump that collects output fully before parsing,
//! and a stream mode whose stdout bytes are handed straight to the HTTP
//! response body. Stderr is drained concurrently in both modes so a full
//! pipe buffer can never deadlock the child.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use tubeget_models::RawMetadata;

use crate::error::{ExtractError, ExtractResult};

/// Baseline flags for metadata mode: dump one JSON document, no
/// download, no warnings, no telemetry, bypass geo restriction, no
/// on-disk cache.
const METADATA_BASE_ARGS: &[&str] = &[
    "--dump-json",
    "--no-warnings",
    "--no-call-home",
    "--geo-bypass",
    "--no-cache-dir",
];

/// Baseline flags shared by stream mode (everything above except the
/// JSON dump).
const STREAM_BASE_ARGS: &[&str] = &[
    "--no-warnings",
    "--no-call-home",
    "--geo-bypass",
    "--no-cache-dir",
];

/// Default timeout for metadata-mode invocations.
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Output containers the download endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp3,
    Mp4,
}

impl Container {
    /// Parse a user-supplied format against the allow-list.
    pub fn parse(raw: &str) -> ExtractResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Mp4 => "video/mp4",
        }
    }
}

/// Caller-selected output directives for stream mode. Passed through to
/// the tool without further validation.
#[derive(Debug, Clone, Copy)]
pub struct StreamSelection {
    pub container: Container,
    /// Vertical resolution cap, video containers only.
    pub quality: Option<u32>,
}

impl StreamSelection {
    /// Output arguments for this selection, ending with `-o -` so the
    /// media bytes go to stdout.
    fn output_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self.container {
            Container::Mp3 => {
                args.extend(["-x", "--audio-format", "mp3"].map(String::from));
            }
            Container::Mp4 => {
                let selector = match self.quality {
                    Some(h) => format!(
                        "bestvideo[ext=mp4][height<={h}]+bestaudio[ext=m4a]/best[ext=mp4][height<={h}]/best"
                    ),
                    None => {
                        "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
                    }
                };
                args.push("-f".to_string());
                args.push(selector);
            }
        }
        args.push("-o".to_string());
        args.push("-".to_string());
        args
    }
}

/// Metadata-fetch seam. The resolver only needs this one operation, so
/// tests drive it with a scripted implementation instead of a real
/// subprocess.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Run the tool in metadata mode with per-strategy extra arguments.
    async fn fetch_metadata(&self, url: &str, extra_args: &[String])
        -> ExtractResult<RawMetadata>;
}

/// Live media bytes, handed straight to the HTTP response body.
pub type MediaStream = Box<dyn AsyncRead + Send + Unpin>;

/// Stream-mode seam, the stream-side counterpart of [`MetadataFetcher`].
/// The download path only needs to open a byte stream for an argument
/// set the resolver already validated.
pub trait StreamOpener: Send + Sync {
    /// Run the tool in stream mode and return its output as a reader.
    fn open_stream(
        &self,
        url: &str,
        strategy_args: &[String],
        selection: StreamSelection,
    ) -> ExtractResult<MediaStream>;
}

/// The real yt-dlp invoker.
#[derive(Debug, Clone)]
pub struct YtDlp {
    metadata_timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self {
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
        }
    }

    /// Override the metadata-mode timeout.
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }
}

impl StreamOpener for YtDlp {
    /// Spawn the tool in stream mode and return its stdout.
    ///
    /// The returned handle is the live media stream; the child and its
    /// stderr are supervised by a background task that logs diagnostics
    /// and the exit status. A non-zero exit after bytes have flowed can
    /// only surface as transport-level truncation, so it is logged and
    /// nothing more.
    fn open_stream(
        &self,
        url: &str,
        strategy_args: &[String],
        selection: StreamSelection,
    ) -> ExtractResult<MediaStream> {
        which::which("yt-dlp").map_err(|_| ExtractError::YtDlpNotFound)?;

        let mut cmd = Command::new("yt-dlp");
        cmd.args(STREAM_BASE_ARGS)
            .args(strategy_args)
            .args(selection.output_args())
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(url, ?selection, "Spawning yt-dlp in stream mode");

        let mut child = cmd.spawn()?;
        let stdout = child.stdout.take().expect("stdout not captured");
        let stderr = child.stderr.take().expect("stderr not captured");

        let url_owned = url.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(url = %url_owned, "yt-dlp: {}", line);
            }
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(url = %url_owned, "Stream finished");
                }
                Ok(status) => {
                    warn!(
                        url = %url_owned,
                        code = ?status.code(),
                        "yt-dlp exited non-zero mid-stream, response truncated"
                    );
                }
                Err(e) => {
                    warn!(url = %url_owned, error = %e, "Failed to reap yt-dlp stream child");
                }
            }
        });

        Ok(Box::new(stdout))
    }
}

#[async_trait]
impl MetadataFetcher for YtDlp {
    async fn fetch_metadata(
        &self,
        url: &str,
        extra_args: &[String],
    ) -> ExtractResult<RawMetadata> {
        which::which("yt-dlp").map_err(|_| ExtractError::YtDlpNotFound)?;

        let mut child = Command::new("yt-dlp")
            .args(METADATA_BASE_ARGS)
            .args(extra_args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout = child.stdout.take().expect("stdout not captured");
        let mut stderr = child.stderr.take().expect("stderr not captured");

        // Drain both pipes while the child runs; waiting first can
        // deadlock once either pipe buffer fills.
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(self.metadata_timeout, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                let secs = self.metadata_timeout.as_secs();
                warn!(url, "yt-dlp metadata fetch timed out after {}s, killing", secs);
                let _ = child.kill().await;
                return Err(ExtractError::Timeout(secs));
            }
        };

        let stdout_buf = stdout_task.await.unwrap_or_default();
        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr_buf);
            debug!(url, "yt-dlp stderr: {}", stderr_text);
            return Err(ExtractError::extraction_failed(first_diagnostic_line(
                &stderr_text,
            )));
        }

        let metadata: RawMetadata = serde_json::from_slice(&stdout_buf)?;
        Ok(metadata)
    }
}

/// First non-empty stderr line, the summary embedded in failure records.
fn first_diagnostic_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_allow_list() {
        assert_eq!(Container::parse("mp3").unwrap(), Container::Mp3);
        assert_eq!(Container::parse("MP4").unwrap(), Container::Mp4);
        assert!(matches!(
            Container::parse("mkv"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            Container::parse("../etc"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_audio_selection_args() {
        let selection = StreamSelection {
            container: Container::Mp3,
            quality: None,
        };
        let args = selection.output_args();
        assert_eq!(args, vec!["-x", "--audio-format", "mp3", "-o", "-"]);
    }

    #[test]
    fn test_video_selection_caps_height() {
        let selection = StreamSelection {
            container: Container::Mp4,
            quality: Some(720),
        };
        let args = selection.output_args();
        assert_eq!(args[0], "-f");
        assert!(args[1].contains("height<=720"));
        assert_eq!(&args[2..], &["-o", "-"]);
    }

    #[test]
    fn test_first_diagnostic_line() {
        let stderr = "\n  \nERROR: Video unavailable\nmore detail here\n";
        assert_eq!(first_diagnostic_line(stderr), "ERROR: Video unavailable");
        assert_eq!(first_diagnostic_line(""), "unknown error");
    }
}
