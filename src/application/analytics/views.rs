//! Query results handed to the outer layer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::models::{Auction, BidRecord, CastMetadata, EffectiveState, Profile};
use crate::domain::services::analytics::{
    Achievement, LeaderboardEntry, LevelProgress, Milestone, TimeWindow,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub window: TimeWindow,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub fid: u64,
    pub profile: Option<Profile>,
    pub total_bids: u64,
    pub total_volume: Decimal,
    pub highest_bid: Decimal,
    pub auctions_participated: u64,
    pub auctions_won: u64,
    pub level: LevelProgress,
    /// Rank by bid count among all bidders
    pub rank: Option<u64>,
    /// "Top N percent"; absent for users without bids
    pub percentile: Option<u32>,
    pub achievements: Vec<Achievement>,
    pub next_milestone: Milestone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_auctions: u64,
    /// Not terminal and not past the end time
    pub active_auctions: u64,
    pub settled_auctions: u64,
    pub total_bids: u64,
    pub unique_bidders: u64,
    pub total_volume: Decimal,
    pub p2p_transfers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorLeaderboardEntry {
    pub rank: u32,
    pub creator_fid: u64,
    pub revenue: Decimal,
    pub auctions: u64,
    pub bids: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionView {
    pub auction: Auction,
    pub effective_state: EffectiveState,
    /// Bid history in time order
    pub bids: Vec<BidRecord>,
    pub highest_bid: Option<Decimal>,
    pub metadata: Option<CastMetadata>,
    pub viewed_at: DateTime<Utc>,
}
