//! Repository for transfers table operations

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use std::fmt;

use crate::domain::models::TransferRecord;
use crate::infrastructure::persistence::entities::transfers;
use crate::infrastructure::persistence::error::DbError;

/// Repository for peer-to-peer transfer persistence
#[derive(Clone)]
pub struct TransferRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for TransferRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRepository").finish_non_exhaustive()
    }
}

impl TransferRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a transfer keyed by (tx_hash, token_id). Returns whether a row was written.
    pub async fn insert_if_absent(&self, transfer: &TransferRecord) -> Result<bool, DbError> {
        let model = transfers::ActiveModel {
            from_address: Set(transfer.from_address.clone()),
            to_address: Set(transfer.to_address.clone()),
            token_id: Set(transfer.token_id.clone()),
            is_p2p: Set(transfer.is_p2p),
            tx_hash: Set(transfer.tx_hash.clone()),
            log_index: Set(transfer.log_index as i64),
            block_number: Set(transfer.block_number as i64),
            transferred_at: Set(transfer.timestamp.into()),
            ..Default::default()
        };

        let inserted = transfers::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([transfers::Column::TxHash, transfers::Column::TokenId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(transfers::Entity::find().count(&self.conn).await?)
    }
}
