use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use super::error::{AnalyticsError, AnalyticsResult};
use super::views::{AuctionView, CreatorLeaderboardEntry, GlobalStats, Leaderboard, UserStats};
use crate::config::AppConfig;
use crate::domain::models::{AuctionState, ContentRef, Profile};
use crate::domain::services::analytics::{
    achievements, bid_count_rank, compare, creator_revenue, detect_outbids, leaderboard,
    level_progress, next_milestone, rivalry_report, to_usd, top_percent, total_bids,
    total_volume, unique_bidders, HeadToHead, RivalryReport, StatsSnapshot, TimeWindow,
};
use crate::domain::services::auction_lifecycle::effective_state;
use crate::domain::services::UserIdentifier;
use crate::infrastructure::api::{CachedProfileProvider, ProfileApiClient, ProfileProvider};
use crate::infrastructure::cache::{bucketed_key, ResultCache};
use crate::infrastructure::persistence::Repositories;
use crate::utils::logging;

pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Read-side entry points over the projected store
pub struct AnalyticsService {
    repositories: Repositories,
    profiles: Option<Arc<dyn ProfileProvider>>,
    cache: ResultCache,
    bucket_secs: u64,
}

impl AnalyticsService {
    pub fn new(
        repositories: Repositories,
        profiles: Option<Arc<dyn ProfileProvider>>,
        result_ttl_secs: u64,
    ) -> Self {
        Self {
            repositories,
            profiles,
            cache: ResultCache::new(result_ttl_secs),
            bucket_secs: result_ttl_secs.max(1),
        }
    }

    /// Service wired to the configured profile provider; without an API key usernames
    /// cannot be resolved and no profiles are attached
    pub fn from_config(repositories: Repositories, config: &AppConfig) -> AnalyticsResult<Self> {
        let profiles: Option<Arc<dyn ProfileProvider>> = if config.profile_api.api_key.is_empty() {
            logging::log_warning("PROFILE_API_KEY not set, profile enrichment disabled");
            None
        } else {
            let client = ProfileApiClient::new(config)?;
            Some(Arc::new(CachedProfileProvider::new(
                Arc::new(client),
                config.profile_api.cache_ttl_secs,
            )))
        };
        Ok(Self::new(repositories, profiles, config.cache.result_ttl_secs))
    }

    /// Serve from the cache or compute and store
    async fn cached<T, F, Fut>(&self, prefix: &str, compute: F) -> AnalyticsResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AnalyticsResult<T>>,
    {
        let key = bucketed_key(prefix, Utc::now(), self.bucket_secs);
        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(hit);
        }
        let result = compute().await?;
        self.cache.put(&key, &result);
        Ok(result)
    }

    /// Resolve a raw identifier to a fid; usernames cost one provider lookup
    pub async fn resolve_user(&self, raw: &str) -> AnalyticsResult<u64> {
        match UserIdentifier::parse(raw)? {
            UserIdentifier::Fid(fid) => Ok(fid),
            UserIdentifier::Username(name) => {
                let provider = self.profiles.as_ref().ok_or_else(|| {
                    AnalyticsError::Internal("No profile provider configured".to_string())
                })?;
                provider
                    .fid_for_username(&name)
                    .await?
                    .ok_or_else(|| AnalyticsError::NotFound(format!("@{}", name)))
            }
        }
    }

    pub async fn leaderboard(&self, window: TimeWindow, limit: usize) -> AnalyticsResult<Leaderboard> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        let prefix = format!("leaderboard:{}:{}", window.as_str(), limit);
        self.cached(&prefix, || async move {
            let pairs = self
                .repositories
                .bid
                .pair_aggregates(window.since(Utc::now()))
                .await?;
            Ok(Leaderboard {
                window,
                entries: leaderboard(&pairs, limit),
            })
        })
        .await
    }

    async fn snapshot(&self, fid: u64) -> AnalyticsResult<StatsSnapshot> {
        let bids = self.repositories.bid.find_by_bidder(fid).await?;
        let won = self.repositories.auction.count_won_by(fid).await?;
        Ok(StatsSnapshot::from_bids(fid, &bids, won))
    }

    async fn profile(&self, fid: u64) -> Option<Profile> {
        let provider = self.profiles.as_ref()?;
        match provider.profiles_by_fid(&[fid]).await {
            Ok(mut profiles) => profiles.remove(&fid),
            Err(e) => {
                logging::log_warning(&format!("Profile lookup for fid {} failed: {}", fid, e));
                None
            }
        }
    }

    pub async fn user_stats(&self, identifier: &str) -> AnalyticsResult<UserStats> {
        let fid = self.resolve_user(identifier).await?;
        let stats = self
            .cached(&format!("user_stats:{}", fid), || async move {
                let snapshot = self.snapshot(fid).await?;
                let counts = self.repositories.bid.bid_counts_by_bidder().await?;
                let rank = bid_count_rank(&counts, fid);

                Ok(UserStats {
                    fid,
                    profile: None,
                    total_bids: snapshot.total_bids,
                    total_volume: to_usd(snapshot.total_volume),
                    highest_bid: to_usd(snapshot.highest_bid),
                    auctions_participated: snapshot.auctions.len() as u64,
                    auctions_won: snapshot.auctions_won,
                    level: level_progress(snapshot.total_bids),
                    rank: rank.map(|(rank, _)| rank),
                    percentile: rank.map(|(rank, total)| top_percent(rank, total)),
                    achievements: achievements(&snapshot),
                    next_milestone: next_milestone(snapshot.total_bids, snapshot.total_volume),
                })
            })
            .await?;

        Ok(UserStats {
            profile: self.profile(fid).await,
            ..stats
        })
    }

    /// Head-to-head; both identifiers are resolved before any stats are read
    pub async fn compare_users(&self, one: &str, two: &str) -> AnalyticsResult<HeadToHead> {
        let fid_one = self.resolve_user(one).await?;
        let fid_two = self.resolve_user(two).await?;

        let snapshot_one = self.snapshot(fid_one).await?;
        let snapshot_two = self.snapshot(fid_two).await?;
        Ok(compare(&snapshot_one, &snapshot_two))
    }

    pub async fn rivalries(&self, identifier: &str) -> AnalyticsResult<RivalryReport> {
        let fid = self.resolve_user(identifier).await?;
        self.cached(&format!("rivalries:{}", fid), || async move {
            let auction_ids = self.repositories.bid.auctions_of_bidder(fid).await?;
            let bids = self.repositories.bid.find_by_auctions(&auction_ids).await?;
            Ok(rivalry_report(fid, &detect_outbids(&bids)))
        })
        .await
    }

    pub async fn global_stats(&self) -> AnalyticsResult<GlobalStats> {
        self.cached("global_stats", || async {
            let now = Utc::now();
            let pairs = self.repositories.bid.pair_aggregates(None).await?;

            Ok(GlobalStats {
                total_auctions: self.repositories.auction.count().await?,
                active_auctions: self.repositories.auction.count_open(now).await?,
                settled_auctions: self
                    .repositories
                    .auction
                    .count_by_state(AuctionState::Settled)
                    .await?,
                total_bids: total_bids(&pairs),
                unique_bidders: unique_bidders(&pairs),
                total_volume: to_usd(total_volume(&pairs)),
                p2p_transfers: self.repositories.transfer.count().await?,
            })
        })
        .await
    }

    pub async fn creator_leaderboard(
        &self,
        limit: usize,
    ) -> AnalyticsResult<Vec<CreatorLeaderboardEntry>> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        self.cached(&format!("creators:{}", limit), || async move {
            let pairs = self.repositories.bid.pair_aggregates(None).await?;
            let creators = self.repositories.auction.creators_by_auction().await?;

            Ok(creator_revenue(&pairs, &creators)
                .into_iter()
                .take(limit)
                .enumerate()
                .map(|(idx, creator)| CreatorLeaderboardEntry {
                    rank: idx as u32 + 1,
                    creator_fid: creator.creator_fid,
                    revenue: to_usd(creator.revenue),
                    auctions: creator.auctions,
                    bids: creator.bids,
                })
                .collect())
        })
        .await
    }

    pub async fn auction(&self, cast_hash: &str) -> AnalyticsResult<AuctionView> {
        let cast_hash = ContentRef::normalize(cast_hash)?;
        let auction = self
            .repositories
            .auction
            .find_by_cast_hash(&cast_hash)
            .await?
            .ok_or_else(|| AnalyticsError::NotFound(format!("auction {}", cast_hash)))?;

        let bids = self.repositories.bid.find_by_auction(auction.id).await?;
        let highest_bid = bids.iter().map(|b| b.amount).max().map(to_usd);

        let metadata = match self.profiles.as_ref() {
            Some(provider) => match provider.cast_metadata(&[cast_hash.clone()]).await {
                Ok(mut casts) => casts.remove(cast_hash.as_str()),
                Err(e) => {
                    logging::log_warning(&format!(
                        "Cast metadata lookup for {} failed: {}",
                        cast_hash, e
                    ));
                    None
                }
            },
            None => None,
        };

        let now = Utc::now();
        Ok(AuctionView {
            effective_state: effective_state(auction.state, auction.end_time, now),
            auction,
            bids,
            highest_bid,
            metadata,
            viewed_at: now,
        })
    }
}
