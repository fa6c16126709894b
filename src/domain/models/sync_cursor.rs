use chrono::{DateTime, Utc};
use std::fmt;

/// Independent event streams, each with its own cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStream {
    Auctions,
    Transfers,
}

impl EventStream {
    pub const ALL: [EventStream; 2] = [EventStream::Auctions, EventStream::Transfers];

    /// Stable identifier used as the cursor key
    pub fn id(&self) -> &'static str {
        match self {
            EventStream::Auctions => "auctions",
            EventStream::Transfers => "transfers",
        }
    }
}

impl fmt::Display for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Last fully committed block for a stream
#[derive(Debug, Clone)]
pub struct SyncCursor {
    pub stream: String,
    pub last_block: u64,
    pub last_synced_at: DateTime<Utc>,
}
