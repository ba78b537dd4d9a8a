//! Cookie-file bootstrap.
//!
//! A cookie blob can be supplied out-of-band via the `YTDLP_COOKIES`
//! environment variable. It is written once at process start to a
//! well-known path; the cookie strategy's applicability predicate then
//! only has to check that a valid file is present, which it re-does on
//! every resolution call since the file can appear or disappear after
//! boot.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

/// Environment variable holding the raw Netscape cookie blob.
pub const COOKIES_ENV_VAR: &str = "YTDLP_COOKIES";

/// Minimum size for a valid cookies file (bytes).
/// A real Netscape cookies file is at least ~50 bytes.
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Validate that cookie content appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with at least six fields.
pub fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.split('\t').count() >= 6 {
            return true;
        }
    }

    false
}

/// Write the `YTDLP_COOKIES` blob to `path` if one is set and valid.
///
/// Returns whether a cookie file was materialized. An invalid blob is
/// dropped with a warning rather than written, so the cookie strategy
/// never runs with garbage credentials.
pub fn materialize_from_env(path: &Path) -> bool {
    let blob = match std::env::var(COOKIES_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => {
            debug!("{} not set, cookie strategy will be skipped", COOKIES_ENV_VAR);
            return false;
        }
    };

    if !is_valid_netscape_cookies(&blob) {
        warn!(
            "{} is not in valid Netscape format, ignoring it",
            COOKIES_ENV_VAR
        );
        return false;
    }

    match fs::write(path, &blob) {
        Ok(()) => {
            info!(path = %path.display(), "Materialized cookie file from environment");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to write cookie file");
            false
        }
    }
}

/// Check whether a usable cookie file is present at `path`.
///
/// Cheap enough to re-evaluate on every resolution call.
pub fn cookies_available(path: &Path) -> bool {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return false,
    };
    if len < MIN_COOKIES_FILE_SIZE {
        debug!(
            path = %path.display(),
            size = len,
            "Cookie file too small, treating as absent"
        );
        return false;
    }

    match fs::read_to_string(path) {
        Ok(content) => is_valid_netscape_cookies(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cookie file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_COOKIES: &str = "# Netscape HTTP Cookie File\n\
        .youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabcdef123456\n";

    #[test]
    fn test_netscape_header_is_valid() {
        assert!(is_valid_netscape_cookies(VALID_COOKIES));
        assert!(is_valid_netscape_cookies("# HTTP Cookie File\n"));
    }

    #[test]
    fn test_tab_separated_entries_without_header() {
        let content = ".youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabc\n";
        assert!(is_valid_netscape_cookies(content));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(!is_valid_netscape_cookies(""));
        assert!(!is_valid_netscape_cookies("not a cookie file"));
        assert!(!is_valid_netscape_cookies("# just a comment\n"));
    }

    #[test]
    fn test_cookies_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");

        assert!(!cookies_available(&path));

        fs::write(&path, "tiny").unwrap();
        assert!(!cookies_available(&path));

        fs::write(&path, VALID_COOKIES).unwrap();
        assert!(cookies_available(&path));
    }
}
