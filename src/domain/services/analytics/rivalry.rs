//! Outbid and rivalry detection
//!
//! Within one auction a bid outbids every earlier, strictly smaller bid placed by
//! a different bidder, as long as no bid from a third bidder lies between the
//! two. A bidder's own earlier bids never count and never break the link.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::volume::to_usd;
use crate::domain::models::BidRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutbidEvent {
    pub auction_id: i32,
    /// Bidder whose bid was beaten
    pub outbid_fid: u64,
    /// Bidder who placed the larger bid
    pub outbidder_fid: u64,
    pub previous_amount: i64,
    pub new_amount: i64,
    pub at: DateTime<Utc>,
}

impl OutbidEvent {
    pub fn delta(&self) -> i64 {
        self.new_amount - self.previous_amount
    }
}

pub fn detect_outbids(bids: &[BidRecord]) -> Vec<OutbidEvent> {
    let mut by_auction: BTreeMap<i32, Vec<&BidRecord>> = BTreeMap::new();
    for bid in bids {
        by_auction.entry(bid.auction_id).or_default().push(bid);
    }

    let mut events = Vec::new();
    for (auction_id, mut history) in by_auction {
        history.sort_by_key(|b| b.sequence_key());

        for (idx, bid) in history.iter().enumerate() {
            let mut counterpart: Option<u64> = None;
            for earlier in history[..idx].iter().rev() {
                if earlier.bidder_fid == bid.bidder_fid {
                    continue;
                }
                match counterpart {
                    None => counterpart = Some(earlier.bidder_fid),
                    Some(fid) if fid != earlier.bidder_fid => break,
                    Some(_) => {}
                }
                if bid.amount > earlier.amount {
                    events.push(OutbidEvent {
                        auction_id,
                        outbid_fid: earlier.bidder_fid,
                        outbidder_fid: bid.bidder_fid,
                        previous_amount: earlier.amount,
                        new_amount: bid.amount,
                        at: bid.timestamp,
                    });
                }
            }
        }
    }
    events
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalSummary {
    pub fid: u64,
    /// Times the target outbid this bidder
    pub target_outbid_them: u64,
    /// Times this bidder outbid the target
    pub they_outbid_target: u64,
    pub largest_delta: Decimal,
}

impl RivalSummary {
    pub fn interactions(&self) -> u64 {
        self.target_outbid_them + self.they_outbid_target
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalryReport {
    pub fid: u64,
    /// Bidders the target outbid, most frequent first
    pub victims: Vec<RivalSummary>,
    /// Bidders who outbid the target, most frequent first
    pub rivals: Vec<RivalSummary>,
    pub biggest_rival: Option<RivalSummary>,
    pub times_outbid: u64,
    pub times_outbidding: u64,
}

pub fn rivalry_report(fid: u64, outbids: &[OutbidEvent]) -> RivalryReport {
    let mut counterparts: HashMap<u64, RivalSummary> = HashMap::new();
    let mut times_outbid = 0;
    let mut times_outbidding = 0;

    for event in outbids {
        let (counterpart, target_won) = if event.outbidder_fid == fid {
            (event.outbid_fid, true)
        } else if event.outbid_fid == fid {
            (event.outbidder_fid, false)
        } else {
            continue;
        };

        let entry = counterparts.entry(counterpart).or_insert(RivalSummary {
            fid: counterpart,
            target_outbid_them: 0,
            they_outbid_target: 0,
            largest_delta: Decimal::ZERO,
        });
        if target_won {
            entry.target_outbid_them += 1;
            times_outbidding += 1;
        } else {
            entry.they_outbid_target += 1;
            times_outbid += 1;
        }
        entry.largest_delta = entry.largest_delta.max(to_usd(event.delta()));
    }

    let mut all: Vec<RivalSummary> = counterparts.into_values().collect();
    all.sort_by(|a, b| a.fid.cmp(&b.fid));

    let mut victims: Vec<RivalSummary> = all
        .iter()
        .filter(|r| r.target_outbid_them > 0)
        .cloned()
        .collect();
    victims.sort_by(|a, b| b.target_outbid_them.cmp(&a.target_outbid_them).then(a.fid.cmp(&b.fid)));

    let mut rivals: Vec<RivalSummary> = all
        .iter()
        .filter(|r| r.they_outbid_target > 0)
        .cloned()
        .collect();
    rivals.sort_by(|a, b| b.they_outbid_target.cmp(&a.they_outbid_target).then(a.fid.cmp(&b.fid)));

    let biggest_rival = all
        .iter()
        .max_by(|a, b| a.interactions().cmp(&b.interactions()).then(b.fid.cmp(&a.fid)))
        .cloned();

    RivalryReport {
        fid,
        victims,
        rivals,
        biggest_rival,
        times_outbid,
        times_outbidding,
    }
}
