//! Analytics queries over the projected store

pub mod error;
pub mod service;
pub mod views;

pub use error::{AnalyticsError, AnalyticsResult};
pub use service::{AnalyticsService, MAX_LEADERBOARD_LIMIT};
pub use views::{AuctionView, CreatorLeaderboardEntry, GlobalStats, Leaderboard, UserStats};
