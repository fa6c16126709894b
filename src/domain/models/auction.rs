use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::models::ContentRef;

/// Persisted lifecycle state of an auction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionState {
    Active,
    Settled,
    Cancelled,
    Recovered,
}

impl AuctionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionState::Active => "active",
            AuctionState::Settled => "settled",
            AuctionState::Cancelled => "cancelled",
            AuctionState::Recovered => "recovered",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuctionState::Active)
    }
}

impl fmt::Display for AuctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AuctionState::Active),
            "settled" => Ok(AuctionState::Settled),
            "cancelled" => Ok(AuctionState::Cancelled),
            "recovered" => Ok(AuctionState::Recovered),
            other => Err(format!("Unknown auction state: {}", other)),
        }
    }
}

/// State as seen by readers; `Ended` is derived from the end time and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveState {
    Active,
    Ended,
    Settled,
    Cancelled,
    Recovered,
}

/// Immutable bidding parameters read from the auction contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Minimum opening bid, payment token base units
    pub min_bid: i64,
    pub min_bid_increment_bps: u16,
    pub protocol_fee_bps: u16,
    pub duration_secs: u32,
    pub extension_secs: u32,
    pub extension_threshold_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionWinner {
    pub address: String,
    pub fid: u64,
    pub amount: i64,
}

/// Insert model for a newly started auction
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub cast_hash: ContentRef,
    pub creator_address: String,
    pub creator_fid: u64,
    pub params: AuctionParams,
    pub end_time: DateTime<Utc>,
    pub tx_hash: String,
    pub block_number: u64,
    /// Timestamp of the block that started the auction
    pub created_at: DateTime<Utc>,
}

/// An auction as projected from chain events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: i32,
    pub cast_hash: ContentRef,
    pub creator_address: String,
    pub creator_fid: u64,
    pub params: AuctionParams,
    pub end_time: DateTime<Utc>,
    pub state: AuctionState,
    /// Present only once the auction is settled
    pub winner: Option<AuctionWinner>,
    pub tx_hash: String,
    pub block_number: u64,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}
