use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored bid, as consumed by the analytics engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRecord {
    pub auction_id: i32,
    pub bidder_address: String,
    pub bidder_fid: u64,
    /// Payment token base units
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
    pub log_index: u64,
}

impl BidRecord {
    /// Total order used when replaying an auction's bid history
    pub fn sequence_key(&self) -> (DateTime<Utc>, u64, u64) {
        (self.timestamp, self.block_number, self.log_index)
    }
}
