use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::volume::pair_aggregates;
use crate::domain::models::BidRecord;

/// Point-in-time activity figures for one bidder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub fid: u64,
    pub total_bids: u64,
    /// Sum of per-auction maxima, base units
    pub total_volume: i64,
    pub highest_bid: i64,
    pub auctions: BTreeSet<i32>,
    pub auctions_won: u64,
}

impl StatsSnapshot {
    pub fn empty(fid: u64) -> Self {
        Self {
            fid,
            total_bids: 0,
            total_volume: 0,
            highest_bid: 0,
            auctions: BTreeSet::new(),
            auctions_won: 0,
        }
    }

    /// Build from bid history; bids by other fids are ignored
    pub fn from_bids(fid: u64, bids: &[BidRecord], auctions_won: u64) -> Self {
        let own: Vec<BidRecord> = bids.iter().filter(|b| b.bidder_fid == fid).cloned().collect();
        let pairs = pair_aggregates(&own);

        Self {
            fid,
            total_bids: own.len() as u64,
            total_volume: pairs.iter().map(|p| p.max_amount).sum(),
            highest_bid: own.iter().map(|b| b.amount).max().unwrap_or(0),
            auctions: pairs.iter().map(|p| p.auction_id).collect(),
            auctions_won,
        }
    }
}
