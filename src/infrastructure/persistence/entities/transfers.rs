//! SeaORM Entity for transfers table
//! Only peer-to-peer collectible transfers are stored

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_address: String,
    pub to_address: String,
    pub token_id: String,
    pub is_p2p: bool,
    pub tx_hash: String,
    pub log_index: i64,
    pub block_number: i64,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub transferred_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
