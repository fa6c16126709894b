pub mod auction_repository;
pub mod bid_repository;
pub mod sync_cursor_repository;
pub mod transfer_repository;

pub use auction_repository::AuctionRepository;
pub use bid_repository::BidRepository;
pub use sync_cursor_repository::SyncCursorRepository;
pub use transfer_repository::TransferRepository;

/// Collection of all repositories
#[derive(Clone, Debug)]
pub struct Repositories {
    /// Repository for auction operations
    pub auction: AuctionRepository,
    /// Repository for bid operations
    pub bid: BidRepository,
    /// Repository for peer-to-peer transfers
    pub transfer: TransferRepository,
    /// Repository for per-stream sync cursors
    pub cursor: SyncCursorRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        auction: AuctionRepository,
        bid: BidRepository,
        transfer: TransferRepository,
        cursor: SyncCursorRepository,
    ) -> Self {
        Self {
            auction,
            bid,
            transfer,
            cursor,
        }
    }
}
