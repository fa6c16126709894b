pub mod auctions;
pub mod bids;
pub mod sync_cursors;
pub mod transfers;
