//! Repository for bids table operations

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use std::fmt;

use crate::domain::models::BidRecord;
use crate::domain::services::analytics::PairAggregate;
use crate::infrastructure::persistence::entities::bids;
use crate::infrastructure::persistence::error::DbError;

/// Repository for bid persistence operations
#[derive(Clone)]
pub struct BidRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for BidRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BidRepository").finish_non_exhaustive()
    }
}

impl BidRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a bid keyed by (tx_hash, log_index). Returns whether a row was written.
    pub async fn insert_if_absent(&self, bid: &BidRecord, tx_hash: &str) -> Result<bool, DbError> {
        let model = bids::ActiveModel {
            auction_id: Set(bid.auction_id),
            bidder_address: Set(bid.bidder_address.clone()),
            bidder_fid: Set(bid.bidder_fid as i64),
            amount: Set(bid.amount),
            bid_time: Set(bid.timestamp.into()),
            tx_hash: Set(tx_hash.to_string()),
            log_index: Set(bid.log_index as i64),
            block_number: Set(bid.block_number as i64),
            ..Default::default()
        };

        let inserted = bids::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([bids::Column::TxHash, bids::Column::LogIndex])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn find_by_bidder(&self, fid: u64) -> Result<Vec<BidRecord>, DbError> {
        let models = ordered(bids::Entity::find().filter(bids::Column::BidderFid.eq(fid as i64)))
            .all(&self.conn)
            .await?;
        Ok(models.into_iter().map(to_domain_model).collect())
    }

    pub async fn find_by_auction(&self, auction_id: i32) -> Result<Vec<BidRecord>, DbError> {
        self.find_by_auctions(&[auction_id]).await
    }

    /// Full bid history of the given auctions, every bidder included
    pub async fn find_by_auctions(&self, auction_ids: &[i32]) -> Result<Vec<BidRecord>, DbError> {
        if auction_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = ordered(
            bids::Entity::find()
                .filter(bids::Column::AuctionId.is_in(auction_ids.iter().copied())),
        )
        .all(&self.conn)
        .await?;
        Ok(models.into_iter().map(to_domain_model).collect())
    }

    /// Auctions `fid` has bid in
    pub async fn auctions_of_bidder(&self, fid: u64) -> Result<Vec<i32>, DbError> {
        let ids: Vec<i32> = bids::Entity::find()
            .select_only()
            .column(bids::Column::AuctionId)
            .filter(bids::Column::BidderFid.eq(fid as i64))
            .group_by(bids::Column::AuctionId)
            .order_by_asc(bids::Column::AuctionId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    /// Lifetime bid count per bidder
    pub async fn bid_counts_by_bidder(&self) -> Result<Vec<(u64, u64)>, DbError> {
        let rows: Vec<(i64, i64)> = bids::Entity::find()
            .select_only()
            .column(bids::Column::BidderFid)
            .column_as(Expr::col(bids::Column::Id).count(), "bid_count")
            .group_by(bids::Column::BidderFid)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(fid, count)| (fid as u64, count as u64))
            .collect())
    }

    /// Per-(bidder, auction) bid count and maximum bid, computed in the database
    pub async fn pair_aggregates(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PairAggregate>, DbError> {
        let rows: Vec<(i64, i32, i64, i64)> = with_since(bids::Entity::find(), since)
            .select_only()
            .column(bids::Column::BidderFid)
            .column(bids::Column::AuctionId)
            .column_as(Expr::col(bids::Column::Id).count(), "bid_count")
            .column_as(Expr::col(bids::Column::Amount).max(), "max_amount")
            .group_by(bids::Column::BidderFid)
            .group_by(bids::Column::AuctionId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(bidder_fid, auction_id, bid_count, max_amount)| PairAggregate {
                bidder_fid: bidder_fid as u64,
                auction_id,
                bid_count: bid_count as u64,
                max_amount,
            })
            .collect())
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(bids::Entity::find().count(&self.conn).await?)
    }
}

fn with_since(query: Select<bids::Entity>, since: Option<DateTime<Utc>>) -> Select<bids::Entity> {
    match since {
        Some(since) => {
            let since: DateTimeWithTimeZone = since.into();
            query.filter(bids::Column::BidTime.gte(since))
        }
        None => query,
    }
}

fn ordered(query: Select<bids::Entity>) -> Select<bids::Entity> {
    query
        .order_by_asc(bids::Column::BidTime)
        .order_by_asc(bids::Column::BlockNumber)
        .order_by_asc(bids::Column::LogIndex)
}

/// Convert database entity to domain model
fn to_domain_model(model: bids::Model) -> BidRecord {
    BidRecord {
        auction_id: model.auction_id,
        bidder_address: model.bidder_address,
        bidder_fid: model.bidder_fid as u64,
        amount: model.amount,
        timestamp: model.bid_time.with_timezone(&Utc),
        block_number: model.block_number as u64,
        log_index: model.log_index as u64,
    }
}
