pub mod auction;
pub mod bid;
pub mod content_ref;
pub mod events;
pub mod profile;
pub mod sync_cursor;
pub mod transfer;

pub use auction::{
    Auction, AuctionParams, AuctionState, AuctionWinner, EffectiveState, NewAuction,
};
pub use bid::BidRecord;
pub use content_ref::{ContentRef, ContentRefError};
pub use events::{AuctionEvent, ChainEvent, DecodedEvent, EventMeta, TransferEvent};
pub use profile::{CastMetadata, Profile};
pub use sync_cursor::{EventStream, SyncCursor};
pub use transfer::TransferRecord;
