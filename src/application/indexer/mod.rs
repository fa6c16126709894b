//! Event ingestion pipeline
//!
//! Fetches contract logs in bounded windows, projects them idempotently and
//! advances a per-stream cursor once a window is committed.

pub mod log_fetcher;
pub mod projector;
pub mod retry_handler;
pub mod sync_runner;

pub use log_fetcher::{FetchedWindow, LogFetcher};
pub use projector::{EventProjector, ProjectionOutcome, ProjectionStats};
pub use retry_handler::RetryHandler;
pub use sync_runner::{plan_windows, StreamReport, SyncReport, SyncRunner};
