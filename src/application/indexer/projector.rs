//! Idempotent projection of decoded events into the relational store
//!
//! Every write is keyed by a natural identity (cast hash, transaction and log
//! index, transaction and token id) so replaying a window changes nothing.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::retry_handler::RetryHandler;
use crate::domain::errors::SyncError;
use crate::domain::models::{
    AuctionEvent, AuctionState, AuctionWinner, BidRecord, ChainEvent, ContentRef, DecodedEvent,
    EventMeta, EventStream, NewAuction, TransferEvent, TransferRecord,
};
use crate::domain::services::auction_lifecycle::{can_extend, plan_transition, TransitionOutcome};
use crate::domain::services::TransferClassifier;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::persistence::Repositories;
use crate::utils::logging;

/// What happened to a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOutcome {
    /// A row was written
    Applied,
    /// Already projected; nothing changed
    Duplicate,
    /// References an auction that is not in the store
    Orphan,
    /// Auction parameters could not be read; the start event was not stored
    DroppedStart,
    /// Lifecycle rules refused the write
    Rejected,
    /// Transfer classified as not peer-to-peer
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    pub applied: u64,
    pub duplicates: u64,
    pub orphans: u64,
    pub dropped_starts: u64,
    pub rejected: u64,
    pub discarded: u64,
}

impl ProjectionStats {
    pub fn record(&mut self, outcome: ProjectionOutcome) {
        match outcome {
            ProjectionOutcome::Applied => self.applied += 1,
            ProjectionOutcome::Duplicate => self.duplicates += 1,
            ProjectionOutcome::Orphan => self.orphans += 1,
            ProjectionOutcome::DroppedStart => self.dropped_starts += 1,
            ProjectionOutcome::Rejected => self.rejected += 1,
            ProjectionOutcome::Discarded => self.discarded += 1,
        }
    }

    pub fn merge(&mut self, other: &ProjectionStats) {
        self.applied += other.applied;
        self.duplicates += other.duplicates;
        self.orphans += other.orphans;
        self.dropped_starts += other.dropped_starts;
        self.rejected += other.rejected;
        self.discarded += other.discarded;
    }
}

/// Block timestamps fetched during one window
#[derive(Debug, Default)]
struct BlockTimestamps {
    by_block: HashMap<u64, DateTime<Utc>>,
}

pub struct EventProjector {
    chain: Arc<dyn ChainClient>,
    repositories: Repositories,
    classifier: TransferClassifier,
    retry_handler: RetryHandler,
}

impl EventProjector {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        repositories: Repositories,
        classifier: TransferClassifier,
        retry_handler: RetryHandler,
    ) -> Self {
        Self {
            chain,
            repositories,
            classifier,
            retry_handler,
        }
    }

    /// Project one window in order. Stops at the first transport or store error.
    pub async fn project_window(
        &self,
        stream: EventStream,
        events: &[DecodedEvent],
    ) -> Result<ProjectionStats, SyncError> {
        let mut stats = ProjectionStats::default();
        let mut timestamps = BlockTimestamps::default();

        for event in events {
            let outcome = self.project(stream, event, &mut timestamps).await?;
            stats.record(outcome);
        }

        Ok(stats)
    }

    async fn project(
        &self,
        stream: EventStream,
        event: &DecodedEvent,
        timestamps: &mut BlockTimestamps,
    ) -> Result<ProjectionOutcome, SyncError> {
        match &event.event {
            ChainEvent::Auction(auction_event) => {
                self.project_auction_event(stream, &event.meta, auction_event, timestamps)
                    .await
            }
            ChainEvent::Transfer(transfer) => {
                self.project_transfer(stream, &event.meta, transfer, timestamps)
                    .await
            }
        }
    }

    async fn project_auction_event(
        &self,
        stream: EventStream,
        meta: &EventMeta,
        event: &AuctionEvent,
        timestamps: &mut BlockTimestamps,
    ) -> Result<ProjectionOutcome, SyncError> {
        if let AuctionEvent::Started {
            cast_hash,
            creator,
            creator_fid,
            end_time,
        } = event
        {
            return self
                .project_start(
                    stream,
                    meta,
                    cast_hash,
                    creator,
                    *creator_fid,
                    *end_time,
                    timestamps,
                )
                .await;
        }

        let cast_hash = event.cast_hash();
        let Some(auction) = self.repositories.auction.find_by_cast_hash(cast_hash).await? else {
            logging::log_warning(&format!(
                "[{}] Orphan {} for unknown auction {} (tx {}, log {})",
                stream,
                event.name(),
                cast_hash,
                meta.tx_hash,
                meta.log_index
            ));
            return Ok(ProjectionOutcome::Orphan);
        };

        match event {
            AuctionEvent::BidPlaced {
                bidder,
                bidder_fid,
                amount,
                ..
            } => {
                let bid = BidRecord {
                    auction_id: auction.id,
                    bidder_address: bidder.clone(),
                    bidder_fid: *bidder_fid,
                    amount: *amount,
                    timestamp: self.block_timestamp(meta.block_number, timestamps).await?,
                    block_number: meta.block_number,
                    log_index: meta.log_index,
                };
                let inserted = self
                    .repositories
                    .bid
                    .insert_if_absent(&bid, &meta.tx_hash)
                    .await?;
                Ok(written(inserted))
            }
            AuctionEvent::Settled {
                winner,
                winner_fid,
                amount,
                ..
            } => {
                let winner = AuctionWinner {
                    address: winner.clone(),
                    fid: *winner_fid,
                    amount: *amount,
                };
                self.transition(
                    stream,
                    meta,
                    auction.id,
                    auction.state,
                    AuctionState::Settled,
                    Some(&winner),
                    timestamps,
                )
                .await
            }
            AuctionEvent::Cancelled { .. } => {
                self.transition(
                    stream,
                    meta,
                    auction.id,
                    auction.state,
                    AuctionState::Cancelled,
                    None,
                    timestamps,
                )
                .await
            }
            AuctionEvent::Recovered { .. } => {
                self.transition(
                    stream,
                    meta,
                    auction.id,
                    auction.state,
                    AuctionState::Recovered,
                    None,
                    timestamps,
                )
                .await
            }
            AuctionEvent::Extended { new_end_time, .. } => {
                if !can_extend(auction.state, auction.end_time, *new_end_time) {
                    if auction.state.is_terminal() {
                        logging::log_warning(&format!(
                            "[{}] Ignoring extension of {} auction {}",
                            stream, auction.state, auction.cast_hash
                        ));
                        return Ok(ProjectionOutcome::Rejected);
                    }
                    return Ok(ProjectionOutcome::Duplicate);
                }
                let extended = self
                    .repositories
                    .auction
                    .extend_end_time(auction.id, *new_end_time)
                    .await?;
                Ok(written(extended))
            }
            AuctionEvent::Started { .. } => Ok(ProjectionOutcome::Duplicate),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn project_start(
        &self,
        stream: EventStream,
        meta: &EventMeta,
        cast_hash: &ContentRef,
        creator: &str,
        creator_fid: u64,
        end_time: DateTime<Utc>,
        timestamps: &mut BlockTimestamps,
    ) -> Result<ProjectionOutcome, SyncError> {
        if self
            .repositories
            .auction
            .find_by_cast_hash(cast_hash)
            .await?
            .is_some()
        {
            return Ok(ProjectionOutcome::Duplicate);
        }

        let params = match self
            .retry_handler
            .execute_with_retry_and_logging(
                || self.chain.auction_params(cast_hash),
                "auctionParams",
                stream.id(),
            )
            .await
        {
            Ok(params) => params,
            Err(e) => {
                logging::log_error(&format!(
                    "[{}] Dropping AuctionStarted for {} (tx {}): parameters unavailable: {}",
                    stream, cast_hash, meta.tx_hash, e
                ));
                return Ok(ProjectionOutcome::DroppedStart);
            }
        };

        let auction = NewAuction {
            cast_hash: cast_hash.clone(),
            creator_address: creator.to_string(),
            creator_fid,
            params,
            end_time,
            tx_hash: meta.tx_hash.clone(),
            block_number: meta.block_number,
            created_at: self.block_timestamp(meta.block_number, timestamps).await?,
        };

        let inserted = self.repositories.auction.insert_if_absent(&auction).await?;
        if inserted {
            logging::log_info(&format!(
                "[{}] Auction {} started by fid {}",
                stream, cast_hash, creator_fid
            ));
        }
        Ok(written(inserted))
    }

    #[allow(clippy::too_many_arguments)]
    async fn transition(
        &self,
        stream: EventStream,
        meta: &EventMeta,
        auction_id: i32,
        current: AuctionState,
        target: AuctionState,
        winner: Option<&AuctionWinner>,
        timestamps: &mut BlockTimestamps,
    ) -> Result<ProjectionOutcome, SyncError> {
        match plan_transition(current, target) {
            TransitionOutcome::NoOp => Ok(ProjectionOutcome::Duplicate),
            TransitionOutcome::Rejected(e) => {
                logging::log_warning(&format!(
                    "[{}] Rejected transition of auction {} (tx {}): {}",
                    stream, auction_id, meta.tx_hash, e
                ));
                Ok(ProjectionOutcome::Rejected)
            }
            TransitionOutcome::Apply => {
                let at = self.block_timestamp(meta.block_number, timestamps).await?;
                let applied = self
                    .repositories
                    .auction
                    .apply_terminal_state(auction_id, target, winner, at)
                    .await?;
                if applied {
                    logging::log_info(&format!(
                        "[{}] Auction {} is now {}",
                        stream, auction_id, target
                    ));
                }
                Ok(written(applied))
            }
        }
    }

    async fn project_transfer(
        &self,
        stream: EventStream,
        meta: &EventMeta,
        transfer: &TransferEvent,
        timestamps: &mut BlockTimestamps,
    ) -> Result<ProjectionOutcome, SyncError> {
        if !self.classifier.is_p2p(transfer) {
            logging::log_debug(&format!(
                "[{}] Discarding non-P2P transfer of token {} (tx {})",
                stream, transfer.token_id, meta.tx_hash
            ));
            return Ok(ProjectionOutcome::Discarded);
        }

        let record = TransferRecord {
            from_address: transfer.from.clone(),
            to_address: transfer.to.clone(),
            token_id: transfer.token_id.clone(),
            is_p2p: true,
            tx_hash: meta.tx_hash.clone(),
            log_index: meta.log_index,
            block_number: meta.block_number,
            timestamp: self.block_timestamp(meta.block_number, timestamps).await?,
        };
        let inserted = self.repositories.transfer.insert_if_absent(&record).await?;
        Ok(written(inserted))
    }

    async fn block_timestamp(
        &self,
        block_number: u64,
        timestamps: &mut BlockTimestamps,
    ) -> Result<DateTime<Utc>, SyncError> {
        if let Some(ts) = timestamps.by_block.get(&block_number) {
            return Ok(*ts);
        }
        let ts = self.chain.block_timestamp(block_number).await?;
        timestamps.by_block.insert(block_number, ts);
        Ok(ts)
    }
}

fn written(rows_written: bool) -> ProjectionOutcome {
    if rows_written {
        ProjectionOutcome::Applied
    } else {
        ProjectionOutcome::Duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record_and_merge() {
        let mut first = ProjectionStats::default();
        first.record(ProjectionOutcome::Applied);
        first.record(ProjectionOutcome::Orphan);

        let mut second = ProjectionStats::default();
        second.record(ProjectionOutcome::Applied);
        second.record(ProjectionOutcome::Discarded);

        first.merge(&second);
        assert_eq!(first.applied, 2);
        assert_eq!(first.orphans, 1);
        assert_eq!(first.discarded, 1);
        assert_eq!(first.duplicates, 0);
    }
}
