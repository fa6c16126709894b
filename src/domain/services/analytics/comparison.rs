//! Head-to-head comparison of two bidders
//!
//! Three criteria, one point each to the strictly greater side. A tied
//! criterion goes to side two; with an odd number of criteria there is always
//! an overall winner.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stats::StatsSnapshot;
use super::volume::to_usd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    BidCount,
    Volume,
    HighestBid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub criterion: Criterion,
    pub side_one: Decimal,
    pub side_two: Decimal,
    pub point_to: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub fid_one: u64,
    pub fid_two: u64,
    pub criteria: Vec<CriterionOutcome>,
    pub points_one: u32,
    pub points_two: u32,
    pub winner: Side,
    /// Auctions both sides bid in, ascending
    pub common_auctions: Vec<i32>,
}

fn score(criterion: Criterion, one: Decimal, two: Decimal) -> CriterionOutcome {
    let point_to = if one > two { Side::One } else { Side::Two };
    CriterionOutcome {
        criterion,
        side_one: one,
        side_two: two,
        point_to,
    }
}

pub fn compare(one: &StatsSnapshot, two: &StatsSnapshot) -> HeadToHead {
    let criteria = vec![
        score(
            Criterion::BidCount,
            Decimal::from(one.total_bids),
            Decimal::from(two.total_bids),
        ),
        score(
            Criterion::Volume,
            to_usd(one.total_volume),
            to_usd(two.total_volume),
        ),
        score(
            Criterion::HighestBid,
            to_usd(one.highest_bid),
            to_usd(two.highest_bid),
        ),
    ];

    let points_one = criteria.iter().filter(|c| c.point_to == Side::One).count() as u32;
    let points_two = criteria.len() as u32 - points_one;
    let winner = if points_one > points_two {
        Side::One
    } else {
        Side::Two
    };

    HeadToHead {
        fid_one: one.fid,
        fid_two: two.fid,
        criteria,
        points_one,
        points_two,
        winner,
        common_auctions: one.auctions.intersection(&two.auctions).copied().collect(),
    }
}
