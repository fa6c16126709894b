//! ABI bindings for the auction and collectible contracts

use ethers::contract::{abigen, EthEvent};
use ethers::types::{Address, H256, U256};

use crate::domain::models::EventStream;

abigen!(
    AuctionHouse,
    r#"[
        function auctionParams(bytes32 castHash) external view returns (uint256 minBid, uint16 minBidIncrementBps, uint16 protocolFeeBps, uint32 duration, uint32 extension, uint32 extensionThreshold)
    ]"#
);

#[derive(Clone, Debug, EthEvent)]
#[ethevent(
    name = "AuctionStarted",
    abi = "AuctionStarted(bytes32,address,uint256,uint256)"
)]
pub struct AuctionStartedEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
    #[ethevent(indexed)]
    pub creator: Address,
    pub creator_fid: U256,
    pub end_time: U256,
}

#[derive(Clone, Debug, EthEvent)]
#[ethevent(name = "BidPlaced", abi = "BidPlaced(bytes32,address,uint256,uint256)")]
pub struct BidPlacedEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
    #[ethevent(indexed)]
    pub bidder: Address,
    pub bidder_fid: U256,
    pub amount: U256,
}

#[derive(Clone, Debug, EthEvent)]
#[ethevent(
    name = "AuctionSettled",
    abi = "AuctionSettled(bytes32,address,uint256,uint256)"
)]
pub struct AuctionSettledEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
    #[ethevent(indexed)]
    pub winner: Address,
    pub winner_fid: U256,
    pub amount: U256,
}

#[derive(Clone, Debug, EthEvent)]
#[ethevent(name = "AuctionExtended", abi = "AuctionExtended(bytes32,uint256)")]
pub struct AuctionExtendedEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
    pub new_end_time: U256,
}

#[derive(Clone, Debug, EthEvent)]
#[ethevent(name = "AuctionCancelled", abi = "AuctionCancelled(bytes32)")]
pub struct AuctionCancelledEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
}

#[derive(Clone, Debug, EthEvent)]
#[ethevent(name = "AuctionRecovered", abi = "AuctionRecovered(bytes32)")]
pub struct AuctionRecoveredEvent {
    #[ethevent(indexed)]
    pub cast_hash: [u8; 32],
}

/// ERC-721 transfer; all three parameters are indexed
#[derive(Clone, Debug, EthEvent)]
#[ethevent(name = "Transfer", abi = "Transfer(address,address,uint256)")]
pub struct CollectibleTransferEvent {
    #[ethevent(indexed)]
    pub from: Address,
    #[ethevent(indexed)]
    pub to: Address,
    #[ethevent(indexed)]
    pub token_id: U256,
}

/// Topic0 whitelist for a stream
pub fn stream_topics(stream: EventStream) -> Vec<H256> {
    match stream {
        EventStream::Auctions => vec![
            AuctionStartedEvent::signature(),
            BidPlacedEvent::signature(),
            AuctionSettledEvent::signature(),
            AuctionExtendedEvent::signature(),
            AuctionCancelledEvent::signature(),
            AuctionRecoveredEvent::signature(),
        ],
        EventStream::Transfers => vec![CollectibleTransferEvent::signature()],
    }
}
