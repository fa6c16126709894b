//! Bounded, ordered log fetching for one stream

use std::sync::Arc;

use crate::domain::models::{DecodedEvent, EventStream};
use crate::infrastructure::chain::abi::stream_topics;
use crate::infrastructure::chain::decoder::decode_log;
use crate::infrastructure::chain::{ChainClient, ChainClientError, ContractAddresses, LogQuery};
use crate::utils::logging;

/// Decoded contents of one block window
#[derive(Debug, Clone, Default)]
pub struct FetchedWindow {
    /// Events in (block number, log index) order
    pub events: Vec<DecodedEvent>,
    pub fetched: u64,
    pub decode_failures: u64,
}

pub struct LogFetcher {
    chain: Arc<dyn ChainClient>,
    addresses: ContractAddresses,
}

impl LogFetcher {
    pub fn new(chain: Arc<dyn ChainClient>, addresses: ContractAddresses) -> Self {
        Self { chain, addresses }
    }

    /// Fetch and decode `[from_block, to_block]` for `stream`.
    ///
    /// A transport failure fails the whole window. A log that cannot be decoded
    /// is logged and skipped.
    pub async fn fetch_logs(
        &self,
        stream: EventStream,
        from_block: u64,
        to_block: u64,
    ) -> Result<FetchedWindow, ChainClientError> {
        let query = LogQuery {
            address: self.addresses.for_stream(stream),
            topics: stream_topics(stream),
            from_block,
            to_block,
        };
        let logs = self.chain.get_logs(&query).await?;

        let mut window = FetchedWindow {
            fetched: logs.len() as u64,
            ..Default::default()
        };

        for log in &logs {
            match decode_log(stream, log) {
                Ok(event) => window.events.push(event),
                Err(e) => {
                    window.decode_failures += 1;
                    logging::log_warning(&format!(
                        "[{}] Skipping undecodable log in tx {:?}: {}",
                        stream, log.transaction_hash, e
                    ));
                }
            }
        }

        window.events.sort_by_key(|e| e.position());
        Ok(window)
    }
}
