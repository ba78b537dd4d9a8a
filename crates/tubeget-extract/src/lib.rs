//! Extraction core for the Tubeget backend.
//!
//! This crate owns everything that touches the external yt-dlp tool:
//! - The ordered strategy catalog with per-call applicability checks
//! - The subprocess invoker (metadata dump and byte-stream modes)
//! - The first-success resolver with fixed inter-attempt delay
//! - The TTL'd metadata cache
//! - Cookie-file bootstrap from the environment

pub mod cache;
pub mod cookies;
pub mod error;
pub mod invoker;
pub mod resolver;
pub mod strategy;

pub use cache::MetadataCache;
pub use error::{ExtractError, ExtractResult};
pub use invoker::{Container, MediaStream, MetadataFetcher, StreamOpener, StreamSelection, YtDlp};
pub use resolver::{ResolutionResult, Resolver};
pub use strategy::{Strategy, StrategyCatalog};
