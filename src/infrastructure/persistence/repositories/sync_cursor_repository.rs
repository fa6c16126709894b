//! Repository for per-stream sync cursors

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::fmt;

use crate::domain::models::{EventStream, SyncCursor};
use crate::infrastructure::persistence::entities::sync_cursors;
use crate::infrastructure::persistence::error::DbError;

/// Repository for sync cursor operations
#[derive(Clone)]
pub struct SyncCursorRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for SyncCursorRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCursorRepository").finish_non_exhaustive()
    }
}

impl SyncCursorRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, stream: EventStream) -> Result<Option<SyncCursor>, DbError> {
        let model = sync_cursors::Entity::find_by_id(stream.id().to_string())
            .one(&self.conn)
            .await?;

        Ok(model.map(|m| SyncCursor {
            stream: m.stream,
            last_block: m.last_block as u64,
            last_synced_at: m.last_synced_at.with_timezone(&Utc),
        }))
    }

    /// Last committed block for the stream, 0 when the stream has never synced
    pub async fn get(&self, stream: EventStream) -> Result<u64, DbError> {
        Ok(self.find(stream).await?.map(|c| c.last_block).unwrap_or(0))
    }

    /// Record `block` as committed. The stored value never decreases.
    pub async fn set(&self, stream: EventStream, block: u64) -> Result<(), DbError> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        let seed = sync_cursors::ActiveModel {
            stream: Set(stream.id().to_string()),
            last_block: Set(block as i64),
            last_synced_at: Set(now),
        };
        let inserted = sync_cursors::Entity::insert(seed)
            .on_conflict(
                OnConflict::column(sync_cursors::Column::Stream)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        if inserted == 0 {
            sync_cursors::Entity::update_many()
                .col_expr(sync_cursors::Column::LastBlock, Expr::value(block as i64))
                .col_expr(sync_cursors::Column::LastSyncedAt, Expr::value(now))
                .filter(sync_cursors::Column::Stream.eq(stream.id()))
                .filter(sync_cursors::Column::LastBlock.lt(block as i64))
                .exec(&self.conn)
                .await?;
        }

        Ok(())
    }
}
