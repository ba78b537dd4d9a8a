//! Strategy catalog.
//!
//! An ordered, fixed list of yt-dlp invocation configurations, most
//! reliable first. The extraction service blocks clients unevenly: a
//! logged-in cookie jar works where an anonymous request gets a bot
//! check, and the simulated Android/TV clients dodge restrictions the
//! web client hits. The resolver walks this list until one entry
//! succeeds.

use std::path::{Path, PathBuf};

/// User agent matching the simulated Android client.
const ANDROID_USER_AGENT: &str =
    "com.google.android.youtube/19.09.37 (Linux; U; Android 11) gzip";

/// One invocation configuration.
///
/// Strategies are immutable process-lifetime data; the only runtime
/// input is the cookie-file path, injected by [`StrategyCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub name: &'static str,
    /// Applicability predicate: entry is only tried when a valid cookie
    /// file is present.
    requires_cookies: bool,
    extra_args: &'static [&'static str],
}

/// Catalog order encodes preference; the resolver never reorders it.
static CATALOG: [Strategy; 4] = [
    Strategy {
        name: "cookies",
        requires_cookies: true,
        extra_args: &[],
    },
    Strategy {
        name: "android",
        requires_cookies: false,
        extra_args: &[
            "--extractor-args",
            "youtube:player_client=android",
            "--user-agent",
            ANDROID_USER_AGENT,
        ],
    },
    Strategy {
        name: "tv_embedded",
        requires_cookies: false,
        extra_args: &["--extractor-args", "youtube:player_client=tv_embedded"],
    },
    Strategy {
        name: "web",
        requires_cookies: false,
        extra_args: &[],
    },
];

/// The ordered strategy list plus the process-scoped cookie path.
#[derive(Debug, Clone)]
pub struct StrategyCatalog {
    cookies_path: PathBuf,
}

impl StrategyCatalog {
    pub fn new(cookies_path: impl Into<PathBuf>) -> Self {
        Self {
            cookies_path: cookies_path.into(),
        }
    }

    /// All strategies in preference order.
    pub fn strategies(&self) -> &'static [Strategy] {
        &CATALOG
    }

    /// Where the cookie strategy expects its file.
    pub fn cookies_path(&self) -> &Path {
        &self.cookies_path
    }

    /// Re-evaluated on every resolution call: cookie-file presence can
    /// change after boot.
    pub fn is_applicable(&self, strategy: &Strategy) -> bool {
        if strategy.requires_cookies {
            crate::cookies::cookies_available(&self.cookies_path)
        } else {
            true
        }
    }

    /// Concrete argument vector for a strategy.
    pub fn args_for(&self, strategy: &Strategy) -> Vec<String> {
        let mut args: Vec<String> = strategy
            .extra_args
            .iter()
            .map(|a| a.to_string())
            .collect();
        if strategy.requires_cookies {
            args.push("--cookies".to_string());
            args.push(self.cookies_path.to_string_lossy().into_owned());
        }
        args
    }

    /// Last-resort entry for the download path: the first strategy that
    /// is applicable without external state. Used when re-resolution
    /// fails before streaming starts — a low-probability attempt beats
    /// no attempt.
    pub fn last_resort(&self) -> (&'static str, Vec<String>) {
        let strategy = &CATALOG[1];
        (strategy.name, self.args_for(strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let names: Vec<&str> = CATALOG.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["cookies", "android", "tv_embedded", "web"]);
    }

    #[test]
    fn test_cookie_strategy_not_applicable_without_file() {
        let catalog = StrategyCatalog::new("/nonexistent/cookies.txt");
        assert!(!catalog.is_applicable(&CATALOG[0]));
        for strategy in &CATALOG[1..] {
            assert!(catalog.is_applicable(strategy));
        }
    }

    #[test]
    fn test_cookie_strategy_args_carry_path() {
        let catalog = StrategyCatalog::new("/tmp/jar.txt");
        let args = catalog.args_for(&CATALOG[0]);
        assert_eq!(args, vec!["--cookies", "/tmp/jar.txt"]);
    }

    #[test]
    fn test_android_args() {
        let catalog = StrategyCatalog::new("/tmp/jar.txt");
        let args = catalog.args_for(&CATALOG[1]);
        assert!(args.contains(&"youtube:player_client=android".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn test_last_resort_is_cookie_free() {
        let catalog = StrategyCatalog::new("/nonexistent/cookies.txt");
        let (name, args) = catalog.last_resort();
        assert_eq!(name, "android");
        assert!(!args.contains(&"--cookies".to_string()));
    }
}
