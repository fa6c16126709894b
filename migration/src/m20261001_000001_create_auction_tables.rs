use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("auctions").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Auctions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Auctions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Auctions::CastHash).string().not_null())
                        .col(ColumnDef::new(Auctions::CreatorAddress).string().not_null())
                        .col(ColumnDef::new(Auctions::CreatorFid).big_integer().not_null())
                        .col(ColumnDef::new(Auctions::MinBid).big_integer().not_null())
                        .col(
                            ColumnDef::new(Auctions::MinBidIncrementBps)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Auctions::ProtocolFeeBps).integer().not_null())
                        .col(ColumnDef::new(Auctions::DurationSecs).big_integer().not_null())
                        .col(ColumnDef::new(Auctions::ExtensionSecs).big_integer().not_null())
                        .col(
                            ColumnDef::new(Auctions::ExtensionThresholdSecs)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Auctions::EndTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Auctions::State)
                                .string()
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Auctions::WinnerAddress).string().null())
                        .col(ColumnDef::new(Auctions::WinnerFid).big_integer().null())
                        .col(ColumnDef::new(Auctions::WinningAmount).big_integer().null())
                        .col(ColumnDef::new(Auctions::TxHash).string().not_null())
                        .col(ColumnDef::new(Auctions::BlockNumber).big_integer().not_null())
                        .col(
                            ColumnDef::new(Auctions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Auctions::SettledAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("auctions_cast_hash_unique")
                        .table(Auctions::Table)
                        .col(Auctions::CastHash)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("auctions_creator_fid")
                        .table(Auctions::Table)
                        .col(Auctions::CreatorFid)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("bids").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Bids::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Bids::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Bids::AuctionId).integer().not_null())
                        .col(ColumnDef::new(Bids::BidderAddress).string().not_null())
                        .col(ColumnDef::new(Bids::BidderFid).big_integer().not_null())
                        .col(ColumnDef::new(Bids::Amount).big_integer().not_null())
                        .col(
                            ColumnDef::new(Bids::BidTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Bids::TxHash).string().not_null())
                        .col(ColumnDef::new(Bids::LogIndex).big_integer().not_null())
                        .col(ColumnDef::new(Bids::BlockNumber).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bids_auction")
                                .from(Bids::Table, Bids::AuctionId)
                                .to(Auctions::Table, Auctions::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("bids_tx_hash_log_index_unique")
                        .table(Bids::Table)
                        .col(Bids::TxHash)
                        .col(Bids::LogIndex)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("bids_auction_id")
                        .table(Bids::Table)
                        .col(Bids::AuctionId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("bids_bidder_fid")
                        .table(Bids::Table)
                        .col(Bids::BidderFid)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("bids_bid_time")
                        .table(Bids::Table)
                        .col(Bids::BidTime)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("transfers").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Transfers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transfers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Transfers::FromAddress).string().not_null())
                        .col(ColumnDef::new(Transfers::ToAddress).string().not_null())
                        .col(ColumnDef::new(Transfers::TokenId).string().not_null())
                        .col(
                            ColumnDef::new(Transfers::IsP2p)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Transfers::TxHash).string().not_null())
                        .col(ColumnDef::new(Transfers::LogIndex).big_integer().not_null())
                        .col(ColumnDef::new(Transfers::BlockNumber).big_integer().not_null())
                        .col(
                            ColumnDef::new(Transfers::TransferredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("transfers_tx_hash_token_id_unique")
                        .table(Transfers::Table)
                        .col(Transfers::TxHash)
                        .col(Transfers::TokenId)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("sync_cursors").await? {
            manager
                .create_table(
                    Table::create()
                        .table(SyncCursors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SyncCursors::Stream)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SyncCursors::LastBlock).big_integer().not_null())
                        .col(
                            ColumnDef::new(SyncCursors::LastSyncedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncCursors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bids::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Auctions::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Auctions {
    Table,
    Id,
    CastHash,
    CreatorAddress,
    CreatorFid,
    MinBid,
    MinBidIncrementBps,
    ProtocolFeeBps,
    DurationSecs,
    ExtensionSecs,
    ExtensionThresholdSecs,
    EndTime,
    State,
    WinnerAddress,
    WinnerFid,
    WinningAmount,
    TxHash,
    BlockNumber,
    CreatedAt,
    SettledAt,
}

#[derive(Iden)]
enum Bids {
    Table,
    Id,
    AuctionId,
    BidderAddress,
    BidderFid,
    Amount,
    BidTime,
    TxHash,
    LogIndex,
    BlockNumber,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    FromAddress,
    ToAddress,
    TokenId,
    IsP2p,
    TxHash,
    LogIndex,
    BlockNumber,
    TransferredAt,
}

#[derive(Iden)]
enum SyncCursors {
    Table,
    Stream,
    LastBlock,
    LastSyncedAt,
}
