//! SeaORM Entity for bids table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub auction_id: i32,
    pub bidder_address: String,
    pub bidder_fid: i64,
    pub amount: i64,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub bid_time: DateTimeWithTimeZone,
    pub tx_hash: String,
    pub log_index: i64,
    pub block_number: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
