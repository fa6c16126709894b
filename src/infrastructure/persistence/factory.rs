use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    AuctionRepository, BidRepository, Repositories, SyncCursorRepository, TransferRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_auction_repository(conn.clone()),
            Self::create_bid_repository(conn.clone()),
            Self::create_transfer_repository(conn.clone()),
            Self::create_sync_cursor_repository(conn),
        )
    }

    /// Create an auction repository
    pub fn create_auction_repository(conn: DatabaseConnection) -> AuctionRepository {
        AuctionRepository::new(conn)
    }

    /// Create a bid repository
    pub fn create_bid_repository(conn: DatabaseConnection) -> BidRepository {
        BidRepository::new(conn)
    }

    /// Create a transfer repository
    pub fn create_transfer_repository(conn: DatabaseConnection) -> TransferRepository {
        TransferRepository::new(conn)
    }

    /// Create a sync cursor repository
    pub fn create_sync_cursor_repository(conn: DatabaseConnection) -> SyncCursorRepository {
        SyncCursorRepository::new(conn)
    }
}
