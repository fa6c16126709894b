//! One sync run over every event stream
//!
//! The chain head is read once per run. Streams run concurrently; within a
//! stream, windows are processed strictly in order and the cursor advances only
//! after a window has been fully projected.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use super::log_fetcher::LogFetcher;
use super::projector::{EventProjector, ProjectionStats};
use super::retry_handler::RetryHandler;
use crate::config::{AppConfig, IndexerConfig};
use crate::domain::errors::SyncError;
use crate::domain::models::EventStream;
use crate::domain::services::TransferClassifier;
use crate::infrastructure::chain::{ChainClient, ContractAddresses};
use crate::infrastructure::persistence::repositories::SyncCursorRepository;
use crate::infrastructure::persistence::Repositories;
use crate::utils::logging;

/// Outcome of one stream within a run
#[derive(Debug, Clone)]
pub struct StreamReport {
    pub stream: EventStream,
    /// Cursor read at the start of the run
    pub start_cursor: u64,
    /// Cursor after the last committed window
    pub final_cursor: u64,
    pub windows_committed: u64,
    pub events_fetched: u64,
    pub decode_failures: u64,
    pub projection: ProjectionStats,
    /// Set when the run for this stream was aborted
    pub error: Option<String>,
}

impl StreamReport {
    fn new(stream: EventStream) -> Self {
        Self {
            stream,
            start_cursor: 0,
            final_cursor: 0,
            windows_committed: 0,
            events_fetched: 0,
            decode_failures: 0,
            projection: ProjectionStats::default(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    /// Head block snapshot the run converged towards
    pub head_block: Option<u64>,
    pub streams: Vec<StreamReport>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.streams.iter().all(StreamReport::is_success)
    }

    pub fn stream(&self, stream: EventStream) -> Option<&StreamReport> {
        self.streams.iter().find(|r| r.stream == stream)
    }
}

/// Inclusive block windows covering `[from, to]`
pub fn plan_windows(from: u64, to: u64, batch_size: u64) -> Vec<(u64, u64)> {
    let batch_size = batch_size.max(1);
    let mut windows = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start.saturating_add(batch_size - 1).min(to);
        windows.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    windows
}

pub struct SyncRunner {
    chain: Arc<dyn ChainClient>,
    fetcher: LogFetcher,
    projector: EventProjector,
    cursors: SyncCursorRepository,
    settings: IndexerConfig,
    auction_start_block: u64,
    collectible_start_block: u64,
}

impl SyncRunner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        repositories: Repositories,
        addresses: ContractAddresses,
        config: &AppConfig,
    ) -> Self {
        let classifier = TransferClassifier::new(&format!("{:#x}", addresses.auction));
        let retry_handler = RetryHandler::with_config(config.indexer.read_through_retries, 500);

        Self {
            fetcher: LogFetcher::new(chain.clone(), addresses),
            projector: EventProjector::new(
                chain.clone(),
                repositories.clone(),
                classifier,
                retry_handler,
            ),
            cursors: repositories.cursor,
            chain,
            settings: config.indexer.clone(),
            auction_start_block: config.chain.auction_start_block,
            collectible_start_block: config.chain.collectible_start_block,
        }
    }

    fn start_block(&self, stream: EventStream) -> u64 {
        match stream {
            EventStream::Auctions => self.auction_start_block,
            EventStream::Transfers => self.collectible_start_block,
        }
    }

    /// Bring every stream up to the current head
    pub async fn run_sync(&self) -> SyncReport {
        let started_at = Utc::now();

        let head = match self.chain.block_number().await {
            Ok(head) => head,
            Err(e) => {
                logging::log_error(&format!("❌ Could not read chain head: {}", e));
                let streams = EventStream::ALL
                    .iter()
                    .map(|stream| StreamReport {
                        error: Some(e.to_string()),
                        ..StreamReport::new(*stream)
                    })
                    .collect();
                return SyncReport {
                    started_at,
                    head_block: None,
                    streams,
                };
            }
        };

        logging::log_info(&format!("🔄 Sync run started, head block {}", head));

        let (auctions, transfers) = futures::join!(
            self.sync_stream(EventStream::Auctions, head),
            self.sync_stream(EventStream::Transfers, head)
        );

        SyncReport {
            started_at,
            head_block: Some(head),
            streams: vec![auctions, transfers],
        }
    }

    /// Sync one stream up to `head`; the returned report carries the new cursor
    pub async fn sync_stream(&self, stream: EventStream, head: u64) -> StreamReport {
        let mut report = StreamReport::new(stream);

        let cursor = match self.cursors.get(stream).await {
            Ok(cursor) => cursor,
            Err(e) => {
                logging::log_error(&format!("[{}] ❌ Could not read cursor: {}", stream, e));
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.start_cursor = cursor;
        report.final_cursor = cursor;

        let from = cursor.saturating_add(1).max(self.start_block(stream));
        let windows = plan_windows(from, head, self.settings.batch_size);
        if windows.is_empty() {
            logging::log_debug(&format!("[{}] Up to date at block {}", stream, cursor));
            return report;
        }

        let window_count = windows.len();
        for (idx, (from_block, to_block)) in windows.into_iter().enumerate() {
            match self.sync_window(stream, from_block, to_block, &mut report).await {
                Ok(()) => {
                    report.windows_committed += 1;
                    report.final_cursor = to_block;
                }
                Err(e) => {
                    logging::log_error(&format!(
                        "[{}] ❌ Window {}-{} failed, stopping at cursor {}: {}",
                        stream, from_block, to_block, report.final_cursor, e
                    ));
                    report.error = Some(e.to_string());
                    break;
                }
            }

            if idx + 1 < window_count && self.settings.window_delay_ms > 0 {
                sleep(Duration::from_millis(self.settings.window_delay_ms)).await;
            }
        }

        logging::log_info(&format!(
            "[{}] ✅ Synced {} windows, {} events applied, cursor {}",
            stream, report.windows_committed, report.projection.applied, report.final_cursor
        ));
        report
    }

    async fn sync_window(
        &self,
        stream: EventStream,
        from_block: u64,
        to_block: u64,
        report: &mut StreamReport,
    ) -> Result<(), SyncError> {
        logging::log_info(&format!(
            "[{}] 📦 Processing blocks {}-{}",
            stream, from_block, to_block
        ));

        let window = self.fetcher.fetch_logs(stream, from_block, to_block).await?;
        report.events_fetched += window.fetched;
        report.decode_failures += window.decode_failures;

        let stats = self.projector.project_window(stream, &window.events).await?;
        report.projection.merge(&stats);

        self.cursors.set(stream, to_block).await?;
        logging::log_debug(&format!("[{}] Cursor advanced to {}", stream, to_block));

        logging::log_info(&format!(
            "[{}] Blocks {}-{} done: {} logs, {} applied, {} orphans",
            stream,
            from_block,
            to_block,
            window.fetched,
            stats.applied,
            stats.orphans
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_windows_caps_width() {
        assert_eq!(
            plan_windows(1, 1200, 500),
            vec![(1, 500), (501, 1000), (1001, 1200)]
        );
    }

    #[test]
    fn test_plan_windows_single_block_and_empty() {
        assert_eq!(plan_windows(7, 7, 500), vec![(7, 7)]);
        assert!(plan_windows(10, 9, 500).is_empty());
    }
}
