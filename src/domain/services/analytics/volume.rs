//! Volume accounting
//!
//! The unit of spending is the highest bid a bidder placed in an auction. Raising
//! your own bid does not add volume, so every volume figure (per user, global,
//! creator revenue, rankings) sums per-(bidder, auction) maxima and never raw bids.
//! Bid counts, in contrast, count every bid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::models::BidRecord;

/// Payment token (USDC) decimals
pub const PAYMENT_TOKEN_DECIMALS: u32 = 6;

/// Convert whole dollars to payment token base units
pub const fn usd_units(dollars: i64) -> i64 {
    dollars * 1_000_000
}

/// Present base units as dollars
pub fn to_usd(units: i64) -> Decimal {
    Decimal::new(units, PAYMENT_TOKEN_DECIMALS)
}

/// Aggregate of one bidder's activity in one auction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAggregate {
    pub bidder_fid: u64,
    pub auction_id: i32,
    pub bid_count: u64,
    /// The volume unit for this pair
    pub max_amount: i64,
}

/// Collapse raw bids into per-(bidder, auction) aggregates
pub fn pair_aggregates(bids: &[BidRecord]) -> Vec<PairAggregate> {
    let mut pairs: BTreeMap<(u64, i32), PairAggregate> = BTreeMap::new();
    for bid in bids {
        let entry = pairs
            .entry((bid.bidder_fid, bid.auction_id))
            .or_insert(PairAggregate {
                bidder_fid: bid.bidder_fid,
                auction_id: bid.auction_id,
                bid_count: 0,
                max_amount: 0,
            });
        entry.bid_count += 1;
        entry.max_amount = entry.max_amount.max(bid.amount);
    }
    pairs.into_values().collect()
}

/// Lifetime totals of one bidder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderTotals {
    pub bidder_fid: u64,
    pub total_bids: u64,
    pub total_volume: i64,
    pub auctions: u64,
}

pub fn bidder_totals(pairs: &[PairAggregate]) -> Vec<BidderTotals> {
    let mut totals: BTreeMap<u64, BidderTotals> = BTreeMap::new();
    for pair in pairs {
        let entry = totals.entry(pair.bidder_fid).or_insert(BidderTotals {
            bidder_fid: pair.bidder_fid,
            total_bids: 0,
            total_volume: 0,
            auctions: 0,
        });
        entry.total_bids += pair.bid_count;
        entry.total_volume += pair.max_amount;
        entry.auctions += 1;
    }
    totals.into_values().collect()
}

pub fn total_volume(pairs: &[PairAggregate]) -> i64 {
    pairs.iter().map(|p| p.max_amount).sum()
}

pub fn total_bids(pairs: &[PairAggregate]) -> u64 {
    pairs.iter().map(|p| p.bid_count).sum()
}

pub fn unique_bidders(pairs: &[PairAggregate]) -> u64 {
    pairs
        .iter()
        .map(|p| p.bidder_fid)
        .collect::<BTreeSet<_>>()
        .len() as u64
}

/// Revenue attributed to one creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRevenue {
    pub creator_fid: u64,
    pub revenue: i64,
    pub auctions: u64,
    pub bids: u64,
}

/// Sum volume units over each creator's auctions
///
/// `creators` maps auction id to creator fid; auctions without bids still count
/// towards the creator's auction total.
pub fn creator_revenue(
    pairs: &[PairAggregate],
    creators: &HashMap<i32, u64>,
) -> Vec<CreatorRevenue> {
    let mut by_creator: BTreeMap<u64, CreatorRevenue> = BTreeMap::new();
    for creator_fid in creators.values() {
        by_creator
            .entry(*creator_fid)
            .or_insert(CreatorRevenue {
                creator_fid: *creator_fid,
                revenue: 0,
                auctions: 0,
                bids: 0,
            })
            .auctions += 1;
    }
    for pair in pairs {
        if let Some(creator_fid) = creators.get(&pair.auction_id) {
            if let Some(entry) = by_creator.get_mut(creator_fid) {
                entry.revenue += pair.max_amount;
                entry.bids += pair.bid_count;
            }
        }
    }

    let mut ranked: Vec<CreatorRevenue> = by_creator.into_values().collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then(b.auctions.cmp(&a.auctions))
            .then(a.creator_fid.cmp(&b.creator_fid))
    });
    ranked
}
