use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use cast_auction_indexer::application::indexer::{SyncReport, SyncRunner};
use cast_auction_indexer::config::AppConfig;
use cast_auction_indexer::infrastructure::chain::{ChainClient, ContractAddresses, EvmClient};
use cast_auction_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use cast_auction_indexer::utils::logging;

fn log_report(report: &SyncReport) {
    for stream in &report.streams {
        match &stream.error {
            None => logging::log_info(&format!(
                "[{}] cursor {} -> {}, {} windows, {} logs, {} applied, {} duplicates, {} orphans, {} decode failures",
                stream.stream,
                stream.start_cursor,
                stream.final_cursor,
                stream.windows_committed,
                stream.events_fetched,
                stream.projection.applied,
                stream.projection.duplicates,
                stream.projection.orphans,
                stream.decode_failures
            )),
            Some(e) => logging::log_error(&format!(
                "[{}] aborted at cursor {}: {}",
                stream.stream, stream.final_cursor, e
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let config = AppConfig::from_env();
    logging::log_info(&format!(
        "🚀 Starting cast-auction-indexer v{}",
        env!("CARGO_PKG_VERSION")
    ));

    let db_pool = DbPool::new(&config).await?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);

    let chain: Arc<dyn ChainClient> = Arc::new(EvmClient::new(&config)?);
    let addresses = ContractAddresses::from_config(&config)?;
    let runner = SyncRunner::new(chain, repositories, addresses, &config);

    let mut ticker = interval(Duration::from_millis(config.indexer.sync_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = runner.run_sync().await;
                log_report(&report);
            }
            _ = tokio::signal::ctrl_c() => {
                logging::log_info("🛑 Shutdown requested, stopping sync loop");
                break;
            }
        }
    }

    Ok(())
}
