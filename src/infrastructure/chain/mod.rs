pub mod abi;
pub mod client;
pub mod decoder;
pub mod error;

pub use client::{ChainClient, EvmClient, LogQuery};
pub use error::ChainClientError;

use ethers::types::Address;

use crate::config::AppConfig;
use crate::domain::models::EventStream;
use client::parse_address;

/// Contract emitting each stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub auction: Address,
    pub collectible: Address,
}

impl ContractAddresses {
    pub fn from_config(config: &AppConfig) -> Result<Self, ChainClientError> {
        Ok(ContractAddresses {
            auction: parse_address(&config.chain.auction_contract)?,
            collectible: parse_address(&config.chain.collectible_contract)?,
        })
    }

    pub fn for_stream(&self, stream: EventStream) -> Address {
        match stream {
            EventStream::Auctions => self.auction,
            EventStream::Transfers => self.collectible,
        }
    }
}
