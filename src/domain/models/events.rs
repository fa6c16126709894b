//! Decoded contract events, independent of the ABI layer

use chrono::{DateTime, Utc};

use crate::domain::models::ContentRef;

/// Provenance of a single log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    Started {
        cast_hash: ContentRef,
        creator: String,
        creator_fid: u64,
        end_time: DateTime<Utc>,
    },
    BidPlaced {
        cast_hash: ContentRef,
        bidder: String,
        bidder_fid: u64,
        amount: i64,
    },
    Settled {
        cast_hash: ContentRef,
        winner: String,
        winner_fid: u64,
        amount: i64,
    },
    Extended {
        cast_hash: ContentRef,
        new_end_time: DateTime<Utc>,
    },
    Cancelled {
        cast_hash: ContentRef,
    },
    Recovered {
        cast_hash: ContentRef,
    },
}

impl AuctionEvent {
    pub fn cast_hash(&self) -> &ContentRef {
        match self {
            AuctionEvent::Started { cast_hash, .. }
            | AuctionEvent::BidPlaced { cast_hash, .. }
            | AuctionEvent::Settled { cast_hash, .. }
            | AuctionEvent::Extended { cast_hash, .. }
            | AuctionEvent::Cancelled { cast_hash }
            | AuctionEvent::Recovered { cast_hash } => cast_hash,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::Started { .. } => "AuctionStarted",
            AuctionEvent::BidPlaced { .. } => "BidPlaced",
            AuctionEvent::Settled { .. } => "AuctionSettled",
            AuctionEvent::Extended { .. } => "AuctionExtended",
            AuctionEvent::Cancelled { .. } => "AuctionCancelled",
            AuctionEvent::Recovered { .. } => "AuctionRecovered",
        }
    }
}

/// ERC-721 transfer of a collectible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    pub token_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    Auction(AuctionEvent),
    Transfer(TransferEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub meta: EventMeta,
    pub event: ChainEvent,
}

impl DecodedEvent {
    /// Ordering key within a fetched window
    pub fn position(&self) -> (u64, u64) {
        (self.meta.block_number, self.meta.log_index)
    }
}
