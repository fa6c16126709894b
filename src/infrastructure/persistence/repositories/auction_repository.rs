//! Repository for auctions table operations

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::models::{
    Auction, AuctionParams, AuctionState, AuctionWinner, ContentRef, NewAuction,
};
use crate::infrastructure::persistence::entities::auctions;
use crate::infrastructure::persistence::error::DbError;

/// Repository for auction persistence operations
#[derive(Clone)]
pub struct AuctionRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for AuctionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuctionRepository").finish_non_exhaustive()
    }
}

impl AuctionRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert an auction unless one already exists for the cast hash.
    /// Returns whether a row was written.
    pub async fn insert_if_absent(&self, auction: &NewAuction) -> Result<bool, DbError> {
        let model = auctions::ActiveModel {
            cast_hash: Set(auction.cast_hash.as_str().to_string()),
            creator_address: Set(auction.creator_address.clone()),
            creator_fid: Set(auction.creator_fid as i64),
            min_bid: Set(auction.params.min_bid),
            min_bid_increment_bps: Set(auction.params.min_bid_increment_bps as i32),
            protocol_fee_bps: Set(auction.params.protocol_fee_bps as i32),
            duration_secs: Set(auction.params.duration_secs as i64),
            extension_secs: Set(auction.params.extension_secs as i64),
            extension_threshold_secs: Set(auction.params.extension_threshold_secs as i64),
            end_time: Set(auction.end_time.into()),
            state: Set(AuctionState::Active.as_str().to_string()),
            winner_address: Set(None),
            winner_fid: Set(None),
            winning_amount: Set(None),
            tx_hash: Set(auction.tx_hash.clone()),
            block_number: Set(auction.block_number as i64),
            created_at: Set(auction.created_at.into()),
            settled_at: Set(None),
            ..Default::default()
        };

        let inserted = auctions::Entity::insert(model)
            .on_conflict(
                OnConflict::column(auctions::Column::CastHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn find_by_cast_hash(&self, cast_hash: &ContentRef) -> Result<Option<Auction>, DbError> {
        let model = auctions::Entity::find()
            .filter(auctions::Column::CastHash.eq(cast_hash.as_str()))
            .one(&self.conn)
            .await?;

        model.map(to_domain_model).transpose()
    }

    pub async fn apply_terminal_state(
        &self,
        id: i32,
        target: AuctionState,
        winner: Option<&AuctionWinner>,
        at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let mut update = auctions::Entity::update_many()
            .col_expr(auctions::Column::State, Expr::value(target.as_str()))
            .filter(auctions::Column::Id.eq(id))
            .filter(auctions::Column::State.eq(AuctionState::Active.as_str()));

        if let Some(winner) = winner {
            let settled_at: DateTimeWithTimeZone = at.into();
            update = update
                .col_expr(
                    auctions::Column::WinnerAddress,
                    Expr::value(winner.address.clone()),
                )
                .col_expr(auctions::Column::WinnerFid, Expr::value(winner.fid as i64))
                .col_expr(auctions::Column::WinningAmount, Expr::value(winner.amount))
                .col_expr(auctions::Column::SettledAt, Expr::value(settled_at));
        }

        let result = update.exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Push the end time of an active auction forward. Never moves it back.
    pub async fn extend_end_time(&self, id: i32, new_end: DateTime<Utc>) -> Result<bool, DbError> {
        let new_end: DateTimeWithTimeZone = new_end.into();
        let result = auctions::Entity::update_many()
            .col_expr(auctions::Column::EndTime, Expr::value(new_end))
            .filter(auctions::Column::Id.eq(id))
            .filter(auctions::Column::State.eq(AuctionState::Active.as_str()))
            .filter(auctions::Column::EndTime.lt(new_end))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Creator fid of every auction, keyed by auction id
    pub async fn creators_by_auction(&self) -> Result<HashMap<i32, u64>, DbError> {
        let rows: Vec<(i32, i64)> = auctions::Entity::find()
            .select_only()
            .column(auctions::Column::Id)
            .column(auctions::Column::CreatorFid)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, creator_fid)| (id, creator_fid as u64))
            .collect())
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(auctions::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_by_state(&self, state: AuctionState) -> Result<u64, DbError> {
        let count = auctions::Entity::find()
            .filter(auctions::Column::State.eq(state.as_str()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Active auctions whose end time is still ahead of `now`
    pub async fn count_open(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        let now: DateTimeWithTimeZone = now.into();
        let count = auctions::Entity::find()
            .filter(auctions::Column::State.eq(AuctionState::Active.as_str()))
            .filter(auctions::Column::EndTime.gt(now))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Number of settled auctions won by `fid`
    pub async fn count_won_by(&self, fid: u64) -> Result<u64, DbError> {
        let count = auctions::Entity::find()
            .filter(auctions::Column::State.eq(AuctionState::Settled.as_str()))
            .filter(auctions::Column::WinnerFid.eq(fid as i64))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}

/// Convert database entity to domain model
fn to_domain_model(model: auctions::Model) -> Result<Auction, DbError> {
    let cast_hash = ContentRef::normalize(&model.cast_hash)
        .map_err(|e| DbError::CorruptRow(format!("auction {}: {}", model.id, e)))?;
    let state = AuctionState::from_str(&model.state)
        .map_err(|e| DbError::CorruptRow(format!("auction {}: {}", model.id, e)))?;

    let winner = match (model.winner_address, model.winner_fid, model.winning_amount) {
        (Some(address), Some(fid), Some(amount)) => Some(AuctionWinner {
            address,
            fid: fid as u64,
            amount,
        }),
        _ => None,
    };

    Ok(Auction {
        id: model.id,
        cast_hash,
        creator_address: model.creator_address,
        creator_fid: model.creator_fid as u64,
        params: AuctionParams {
            min_bid: model.min_bid,
            min_bid_increment_bps: model.min_bid_increment_bps as u16,
            protocol_fee_bps: model.protocol_fee_bps as u16,
            duration_secs: model.duration_secs as u32,
            extension_secs: model.extension_secs as u32,
            extension_threshold_secs: model.extension_threshold_secs as u32,
        },
        end_time: model.end_time.with_timezone(&Utc),
        state,
        winner,
        tx_hash: model.tx_hash,
        block_number: model.block_number as u64,
        created_at: model.created_at.with_timezone(&Utc),
        settled_at: model.settled_at.map(|t| t.with_timezone(&Utc)),
    })
}
