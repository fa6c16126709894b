use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::volume::{bidder_totals, to_usd, BidderTotals, PairAggregate};

/// Period a leaderboard is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    AllTime,
}

impl TimeWindow {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "24h" => Some(TimeWindow::Day),
            "week" | "7d" => Some(TimeWindow::Week),
            "month" | "30d" => Some(TimeWindow::Month),
            "all" | "all_time" | "alltime" => Some(TimeWindow::AllTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::AllTime => "all_time",
        }
    }

    /// Earliest bid time included, `None` for all-time
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::Day => Some(now - Duration::days(1)),
            TimeWindow::Week => Some(now - Duration::days(7)),
            TimeWindow::Month => Some(now - Duration::days(30)),
            TimeWindow::AllTime => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub fid: u64,
    pub total_bids: u64,
    pub total_volume: Decimal,
    pub auctions: u64,
}

/// Bid count descending, then volume descending, then fid for a stable order
fn leaderboard_order(a: &BidderTotals, b: &BidderTotals) -> Ordering {
    b.total_bids
        .cmp(&a.total_bids)
        .then(b.total_volume.cmp(&a.total_volume))
        .then(a.bidder_fid.cmp(&b.bidder_fid))
}

pub fn rank_bidders(mut totals: Vec<BidderTotals>) -> Vec<BidderTotals> {
    totals.sort_by(leaderboard_order);
    totals
}

/// Build a leaderboard from pair aggregates already restricted to the window
pub fn leaderboard(pairs: &[PairAggregate], limit: usize) -> Vec<LeaderboardEntry> {
    rank_bidders(bidder_totals(pairs))
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, totals)| LeaderboardEntry {
            rank: idx as u32 + 1,
            fid: totals.bidder_fid,
            total_bids: totals.total_bids,
            total_volume: to_usd(totals.total_volume),
            auctions: totals.auctions,
        })
        .collect()
}

/// Rank of `fid` by bid count: one plus the number of bidders with strictly more bids
///
/// Returns `(rank, total_bidders)`, or `None` when the fid never bid.
pub fn bid_count_rank(counts: &[(u64, u64)], fid: u64) -> Option<(u64, u64)> {
    let own = counts.iter().find(|(f, _)| *f == fid).map(|(_, c)| *c)?;
    if own == 0 {
        return None;
    }
    let ahead = counts.iter().filter(|(_, c)| *c > own).count() as u64;
    Some((ahead + 1, counts.len() as u64))
}

/// "Top N percent" figure for a rank
pub fn top_percent(rank: u64, total: u64) -> u32 {
    if total == 0 {
        return 100;
    }
    ((rank * 100).div_ceil(total)).clamp(1, 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::analytics::test_support::bid;
    use crate::domain::services::analytics::volume::{pair_aggregates, usd_units};

    #[test]
    fn test_bid_count_outranks_volume() {
        let bids = vec![
            bid(1, 10, usd_units(500), 0),
            bid(1, 20, usd_units(1), 10),
            bid(2, 20, usd_units(1), 20),
        ];
        let board = leaderboard(&pair_aggregates(&bids), 10);
        assert_eq!(board[0].fid, 20);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].fid, 10);
    }

    #[test]
    fn test_volume_breaks_bid_count_ties() {
        let bids = vec![
            bid(1, 10, usd_units(5), 0),
            bid(1, 20, usd_units(9), 10),
            bid(1, 30, usd_units(9), 20),
        ];
        let board = leaderboard(&pair_aggregates(&bids), 10);
        let order: Vec<u64> = board.iter().map(|e| e.fid).collect();
        assert_eq!(order, vec![20, 30, 10]);
    }

    #[test]
    fn test_ordering_is_lexicographic_non_increasing() {
        let mut bids = Vec::new();
        for (i, fid) in [4u64, 1, 3, 2, 4, 4, 3, 5].iter().enumerate() {
            bids.push(bid((i % 3) as i32, *fid, usd_units(i as i64 + 1), i as i64 * 10));
        }
        let ranked = rank_bidders(bidder_totals(&pair_aggregates(&bids)));
        for pair in ranked.windows(2) {
            assert!(
                (pair[0].total_bids, pair[0].total_volume)
                    >= (pair[1].total_bids, pair[1].total_volume)
            );
        }
    }

    #[test]
    fn test_limit_truncates() {
        let bids = vec![bid(1, 1, 1, 0), bid(1, 2, 1, 1), bid(1, 3, 1, 2)];
        assert_eq!(leaderboard(&pair_aggregates(&bids), 2).len(), 2);
    }

    #[test]
    fn test_bid_count_rank_and_percentile() {
        let counts = vec![(1, 10), (2, 5), (3, 5), (4, 1)];
        assert_eq!(bid_count_rank(&counts, 1), Some((1, 4)));
        assert_eq!(bid_count_rank(&counts, 3), Some((2, 4)));
        assert_eq!(bid_count_rank(&counts, 4), Some((4, 4)));
        assert_eq!(bid_count_rank(&counts, 9), None);
        assert_eq!(top_percent(1, 4), 25);
        assert_eq!(top_percent(4, 4), 100);
        assert_eq!(top_percent(1, 1000), 1);
    }

    #[test]
    fn test_window_parsing_and_bounds() {
        let now = Utc::now();
        assert_eq!(TimeWindow::parse("WEEK"), Some(TimeWindow::Week));
        assert_eq!(TimeWindow::parse("forever"), None);
        assert_eq!(TimeWindow::AllTime.since(now), None);
        assert_eq!(TimeWindow::Day.since(now), Some(now - Duration::days(1)));
    }
}
