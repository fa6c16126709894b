//! Gamified progression: levels, achievements and the next milestone

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stats::StatsSnapshot;
use super::volume::{to_usd, usd_units};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub tier: u8,
    pub name: &'static str,
    pub min_bids: u64,
}

/// Ordered by `min_bids`
pub const LEVELS: [Level; 8] = [
    Level { tier: 1, name: "Newcomer", min_bids: 0 },
    Level { tier: 2, name: "Bidder", min_bids: 1 },
    Level { tier: 3, name: "Regular", min_bids: 5 },
    Level { tier: 4, name: "Enthusiast", min_bids: 10 },
    Level { tier: 5, name: "Collector", min_bids: 25 },
    Level { tier: 6, name: "Patron", min_bids: 50 },
    Level { tier: 7, name: "Connoisseur", min_bids: 100 },
    Level { tier: 8, name: "Legend", min_bids: 250 },
];

pub const BID_MILESTONES: [u64; 9] = [1, 5, 10, 25, 50, 100, 250, 500, 1000];

pub const VOLUME_MILESTONES: [i64; 7] = [
    usd_units(100),
    usd_units(500),
    usd_units(1_000),
    usd_units(5_000),
    usd_units(10_000),
    usd_units(50_000),
    usd_units(100_000),
];

pub fn level_for(total_bids: u64) -> &'static Level {
    LEVELS
        .iter()
        .rev()
        .find(|level| total_bids >= level.min_bids)
        .unwrap_or(&LEVELS[0])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub tier: u8,
    pub name: String,
    pub min_bids: u64,
    pub next_name: Option<String>,
    pub next_min_bids: Option<u64>,
    pub bids_to_next: Option<u64>,
}

pub fn level_progress(total_bids: u64) -> LevelProgress {
    let level = level_for(total_bids);
    let next = LEVELS.iter().find(|l| l.min_bids > total_bids);

    LevelProgress {
        tier: level.tier,
        name: level.name.to_string(),
        min_bids: level.min_bids,
        next_name: next.map(|l| l.name.to_string()),
        next_min_bids: next.map(|l| l.min_bids),
        bids_to_next: next.map(|l| l.min_bids - total_bids),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstBid,
    TenBids,
    FiftyBids,
    HundredBids,
    Volume100,
    Volume1k,
    Volume10k,
    BigBid,
    Winner,
}

impl Achievement {
    pub const ALL: [Achievement; 9] = [
        Achievement::FirstBid,
        Achievement::TenBids,
        Achievement::FiftyBids,
        Achievement::HundredBids,
        Achievement::Volume100,
        Achievement::Volume1k,
        Achievement::Volume10k,
        Achievement::BigBid,
        Achievement::Winner,
    ];

    pub fn is_earned(&self, stats: &StatsSnapshot) -> bool {
        match self {
            Achievement::FirstBid => stats.total_bids >= 1,
            Achievement::TenBids => stats.total_bids >= 10,
            Achievement::FiftyBids => stats.total_bids >= 50,
            Achievement::HundredBids => stats.total_bids >= 100,
            Achievement::Volume100 => stats.total_volume >= usd_units(100),
            Achievement::Volume1k => stats.total_volume >= usd_units(1_000),
            Achievement::Volume10k => stats.total_volume >= usd_units(10_000),
            Achievement::BigBid => stats.highest_bid >= usd_units(500),
            Achievement::Winner => stats.auctions_won >= 1,
        }
    }
}

/// Every achievement the snapshot satisfies; derived on read, never stored
pub fn achievements(stats: &StatsSnapshot) -> Vec<Achievement> {
    Achievement::ALL
        .iter()
        .copied()
        .filter(|a| a.is_earned(stats))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    Bids { target: u64, remaining: u64 },
    Volume { target: Decimal, remaining: Decimal },
    /// Both ladders exhausted
    Legendary,
}

/// Bid-count ladder first, then the volume ladder, then `Legendary`
pub fn next_milestone(total_bids: u64, total_volume: i64) -> Milestone {
    if let Some(target) = BID_MILESTONES.iter().find(|t| **t > total_bids) {
        return Milestone::Bids {
            target: *target,
            remaining: target - total_bids,
        };
    }
    if let Some(target) = VOLUME_MILESTONES.iter().find(|t| **t > total_volume) {
        return Milestone::Volume {
            target: to_usd(*target),
            remaining: to_usd(target - total_volume),
        };
    }
    Milestone::Legendary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_bids: u64, total_volume: i64, highest_bid: i64, won: u64) -> StatsSnapshot {
        StatsSnapshot {
            total_bids,
            total_volume,
            highest_bid,
            auctions_won: won,
            ..StatsSnapshot::empty(1)
        }
    }

    #[test]
    fn test_level_ladder_boundaries() {
        assert_eq!(level_for(0).name, "Newcomer");
        assert_eq!(level_for(1).name, "Bidder");
        assert_eq!(level_for(9).name, "Regular");
        assert_eq!(level_for(10).name, "Enthusiast");
        assert_eq!(level_for(10_000).name, "Legend");
    }

    #[test]
    fn test_level_progress_reports_gap_to_next_tier() {
        let progress = level_progress(7);
        assert_eq!(progress.name, "Regular");
        assert_eq!(progress.next_name.as_deref(), Some("Enthusiast"));
        assert_eq!(progress.bids_to_next, Some(3));
        assert_eq!(level_progress(300).next_name, None);
    }

    #[test]
    fn test_achievements_are_independent() {
        let earned = achievements(&stats(1, 0, usd_units(600), 0));
        assert_eq!(earned, vec![Achievement::FirstBid, Achievement::BigBid]);

        let earned = achievements(&stats(12, usd_units(1_500), usd_units(100), 2));
        assert!(earned.contains(&Achievement::TenBids));
        assert!(earned.contains(&Achievement::Volume1k));
        assert!(earned.contains(&Achievement::Winner));
        assert!(!earned.contains(&Achievement::BigBid));
        assert!(!earned.contains(&Achievement::Volume10k));

        assert!(achievements(&stats(0, 0, 0, 0)).is_empty());
    }

    #[test]
    fn test_next_milestone_walks_both_ladders() {
        assert_eq!(
            next_milestone(0, 0),
            Milestone::Bids { target: 1, remaining: 1 }
        );
        assert_eq!(
            next_milestone(10, 0),
            Milestone::Bids { target: 25, remaining: 15 }
        );
        assert_eq!(
            next_milestone(1000, usd_units(250)),
            Milestone::Volume {
                target: Decimal::new(500, 0),
                remaining: Decimal::new(250, 0),
            }
        );
        assert_eq!(
            next_milestone(5000, usd_units(100_000)),
            Milestone::Legendary
        );
    }
}
