//! Ordered-fallback metadata resolver.
//!
//! Walks the strategy catalog in order, invoking the metadata fetcher
//! per applicable entry and stopping at the first success. Reliability
//! ordering is encoded in the catalog, so there is no "best result"
//! search. Failures trigger a fixed inter-attempt delay before the next
//! candidate, a blunt guard against the extraction service's abuse-rate
//! defenses.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use tubeget_models::RawMetadata;

use crate::error::{ExtractError, ExtractResult};
use crate::invoker::MetadataFetcher;
use crate::strategy::StrategyCatalog;

/// Default pause between failed attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Metadata paired with the argument set that produced it.
///
/// Success is URL- and client-context-dependent, so the stream path must
/// reuse these exact arguments rather than re-deriving its own.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    pub metadata: RawMetadata,
    pub strategy: &'static str,
    pub args: Vec<String>,
}

/// First-success resolver over the strategy catalog.
///
/// The fetcher is held behind the [`MetadataFetcher`] seam so callers
/// can substitute a scripted one in tests.
pub struct Resolver {
    catalog: StrategyCatalog,
    fetcher: Arc<dyn MetadataFetcher>,
    retry_delay: Duration,
}

impl Resolver {
    pub fn new(catalog: StrategyCatalog, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            catalog,
            fetcher,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the inter-attempt delay (zero in tests).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn catalog(&self) -> &StrategyCatalog {
        &self.catalog
    }

    /// Resolve metadata for a URL.
    ///
    /// Skipped strategies are recorded as not-applicable in the logs but
    /// never surface as errors; only attempted failures do. When every
    /// applicable strategy fails, the error carries the last failure's
    /// diagnostic summary — typically the most informative one, coming
    /// from the least restrictive fallback.
    pub async fn resolve(&self, url: &str) -> ExtractResult<ResolutionResult> {
        let strategies = self.catalog.strategies();
        let mut last_failure: Option<(&'static str, String)> = None;

        for (index, strategy) in strategies.iter().enumerate() {
            if !self.catalog.is_applicable(strategy) {
                debug!(strategy = strategy.name, url, "Strategy not applicable, skipping");
                continue;
            }

            let args = self.catalog.args_for(strategy);
            info!(
                strategy = strategy.name,
                attempt = index + 1,
                url,
                "Attempting metadata extraction"
            );

            match self.fetcher.fetch_metadata(url, &args).await {
                Ok(metadata) => {
                    info!(strategy = strategy.name, url, "Metadata extraction succeeded");
                    return Ok(ResolutionResult {
                        metadata,
                        strategy: strategy.name,
                        args,
                    });
                }
                Err(e) => {
                    let summary = e.summary();
                    warn!(strategy = strategy.name, url, error = %summary, "Strategy failed");
                    last_failure = Some((strategy.name, summary));

                    if index + 1 < strategies.len() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        let summary = match last_failure {
            Some((name, summary)) => format!("{name}: {summary}"),
            None => "no applicable strategy".to_string(),
        };
        warn!(url, summary, "All strategies exhausted");
        Err(ExtractError::ResolutionExhausted { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Scripted fetcher: per-strategy outcome plus a call log.
    struct ScriptedFetcher {
        // strategy marker (first distinguishing arg, or "" for web) -> succeed?
        outcomes: HashMap<&'static str, bool>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(outcomes: &[(&'static str, bool)]) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn attempted(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn strategy_marker(args: &[String]) -> String {
        if args.iter().any(|a| a == "--cookies") {
            "cookies".to_string()
        } else if args.iter().any(|a| a.contains("player_client=android")) {
            "android".to_string()
        } else if args.iter().any(|a| a.contains("player_client=tv_embedded")) {
            "tv_embedded".to_string()
        } else {
            "web".to_string()
        }
    }

    #[async_trait]
    impl MetadataFetcher for ScriptedFetcher {
        async fn fetch_metadata(
            &self,
            _url: &str,
            extra_args: &[String],
        ) -> ExtractResult<RawMetadata> {
            let marker = strategy_marker(extra_args);
            self.calls.lock().unwrap().push(marker.clone());
            if self.outcomes.get(marker.as_str()).copied().unwrap_or(false) {
                Ok(RawMetadata {
                    title: Some(format!("via {marker}")),
                    ..Default::default()
                })
            } else {
                Err(ExtractError::extraction_failed(format!(
                    "ERROR: {marker} blocked"
                )))
            }
        }
    }

    fn resolver(fetcher: ScriptedFetcher) -> (Resolver, Arc<ScriptedFetcher>) {
        // Nonexistent cookie path: the cookies strategy is inapplicable
        // unless a test provides a real file.
        let catalog = StrategyCatalog::new("/nonexistent/tubeget-test-cookies.txt");
        let fetcher = Arc::new(fetcher);
        let r = Resolver::new(catalog, fetcher.clone()).with_retry_delay(Duration::ZERO);
        (r, fetcher)
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let (r, fetcher) =
            resolver(ScriptedFetcher::new(&[("android", true), ("tv_embedded", true)]));
        let result = r.resolve("https://x/1").await.unwrap();

        assert_eq!(result.strategy, "android");
        assert!(result
            .args
            .iter()
            .any(|a| a.contains("player_client=android")));
        // Only strategies 1..k attempted, in catalog order.
        assert_eq!(fetcher.attempted(), vec!["android"]);
    }

    #[tokio::test]
    async fn test_fallback_returns_winning_parameters() {
        // A (android) fails, B (tv_embedded) succeeds.
        let (r, fetcher) = resolver(ScriptedFetcher::new(&[("tv_embedded", true)]));
        let result = r.resolve("https://x/1").await.unwrap();

        assert_eq!(result.strategy, "tv_embedded");
        assert!(result
            .args
            .iter()
            .any(|a| a.contains("player_client=tv_embedded")));
        assert_eq!(fetcher.attempted(), vec!["android", "tv_embedded"]);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_failure() {
        let (r, fetcher) = resolver(ScriptedFetcher::new(&[]));
        let err = r.resolve("https://x/1").await.unwrap_err();

        match err {
            ExtractError::ResolutionExhausted { summary } => {
                // Last attempted strategy is the final catalog entry.
                assert_eq!(summary, "web: ERROR: web blocked");
            }
            other => panic!("expected ResolutionExhausted, got {other:?}"),
        }
        assert_eq!(fetcher.attempted(), vec!["android", "tv_embedded", "web"]);
    }

    #[tokio::test]
    async fn test_cookie_strategy_gated_by_predicate() {
        // Even if the cookie strategy would succeed, it must never be
        // attempted without the file.
        let (r, fetcher) = resolver(ScriptedFetcher::new(&[("cookies", true), ("web", true)]));
        let result = r.resolve("https://x/1").await.unwrap();

        assert_ne!(result.strategy, "cookies");
        assert!(!fetcher.attempted().contains(&"cookies".to_string()));
    }

    #[tokio::test]
    async fn test_cookie_strategy_attempted_when_file_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(
            &path,
            "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabc\n",
        )
        .unwrap();

        let catalog = StrategyCatalog::new(&path);
        let fetcher = Arc::new(ScriptedFetcher::new(&[("cookies", true)]));
        let r = Resolver::new(catalog, fetcher).with_retry_delay(Duration::ZERO);

        let result = r.resolve("https://x/1").await.unwrap();
        assert_eq!(result.strategy, "cookies");
        assert!(result.args.iter().any(|a| a == "--cookies"));
    }
}
