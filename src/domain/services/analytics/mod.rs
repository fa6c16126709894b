//! Aggregation rules over the projected bid history
//!
//! Everything here is a pure function of bids (or per-pair aggregates already
//! computed by the store) so results are deterministic and replayable.

pub mod comparison;
pub mod leaderboard;
pub mod progression;
pub mod rivalry;
pub mod stats;
pub mod volume;

pub use comparison::{compare, Criterion, CriterionOutcome, HeadToHead, Side};
pub use leaderboard::{bid_count_rank, leaderboard, top_percent, LeaderboardEntry, TimeWindow};
pub use progression::{
    achievements, level_progress, next_milestone, Achievement, LevelProgress, Milestone,
};
pub use rivalry::{detect_outbids, rivalry_report, OutbidEvent, RivalSummary, RivalryReport};
pub use stats::StatsSnapshot;
pub use volume::{
    bidder_totals, creator_revenue, pair_aggregates, to_usd, total_bids, total_volume,
    unique_bidders, usd_units, BidderTotals, CreatorRevenue, PairAggregate,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::domain::models::BidRecord;

    /// Bid `secs` seconds after a fixed epoch; block and log index follow time
    pub fn bid(auction_id: i32, bidder_fid: u64, amount: i64, secs: i64) -> BidRecord {
        BidRecord {
            auction_id,
            bidder_address: format!("0x{:040x}", bidder_fid),
            bidder_fid,
            amount,
            timestamp: Utc.timestamp_opt(1_735_725_600 + secs, 0).unwrap(),
            block_number: 1_000 + secs as u64,
            log_index: 0,
        }
    }
}
