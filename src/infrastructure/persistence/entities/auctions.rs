//! SeaORM Entity for auctions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auctions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub cast_hash: String,
    pub creator_address: String,
    pub creator_fid: i64,
    pub min_bid: i64,
    pub min_bid_increment_bps: i32,
    pub protocol_fee_bps: i32,
    pub duration_secs: i64,
    pub extension_secs: i64,
    pub extension_threshold_secs: i64,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub end_time: DateTimeWithTimeZone,
    pub state: String,
    pub winner_address: Option<String>,
    pub winner_fid: Option<i64>,
    pub winning_amount: Option<i64>,
    pub tx_hash: String,
    pub block_number: i64,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "TimestampWithTimeZone", nullable)]
    pub settled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
