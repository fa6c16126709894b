use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collectible transfer. Only peer-to-peer transfers are ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from_address: String,
    pub to_address: String,
    /// Decimal string of the uint256 token id
    pub token_id: String,
    pub is_p2p: bool,
    pub tx_hash: String,
    pub log_index: u64,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}
