use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, BlockId, BlockNumber, Filter, Log, H256, U64};
use std::str::FromStr;
use std::sync::Arc;

use super::abi::AuctionHouse;
use super::decoder::{to_amount, to_timestamp};
use super::error::ChainClientError;
use crate::config::AppConfig;
use crate::domain::models::{AuctionParams, ContentRef};

/// A bounded, inclusive log query against one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub address: Address,
    /// Accepted topic0 values
    pub topics: Vec<H256>,
    pub from_block: u64,
    pub to_block: u64,
}

/// Read access to the chain used by the indexer
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head block number
    async fn block_number(&self) -> Result<u64, ChainClientError>;

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<Log>, ChainClientError>;

    async fn block_timestamp(&self, block_number: u64) -> Result<DateTime<Utc>, ChainClientError>;

    /// Read-only call returning the configured parameters of an auction
    async fn auction_params(&self, cast_hash: &ContentRef)
        -> Result<AuctionParams, ChainClientError>;
}

/// JSON-RPC backed client
pub struct EvmClient {
    provider: Arc<Provider<Http>>,
    auction_house: AuctionHouse<Provider<Http>>,
}

impl EvmClient {
    pub fn new(config: &AppConfig) -> Result<Self, ChainClientError> {
        let provider = Provider::<Http>::try_from(config.chain.rpc_url.as_str()).map_err(|e| {
            ChainClientError::ConfigError(format!(
                "Invalid RPC URL {}: {}",
                config.chain.rpc_url, e
            ))
        })?;
        let provider = Arc::new(provider);

        let auction_address = parse_address(&config.chain.auction_contract)?;
        let auction_house = AuctionHouse::new(auction_address, provider.clone());

        Ok(EvmClient {
            provider,
            auction_house,
        })
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    async fn block_number(&self) -> Result<u64, ChainClientError> {
        Ok(self.provider.get_block_number().await?.as_u64())
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<Log>, ChainClientError> {
        let filter = Filter::new()
            .address(query.address)
            .topic0(query.topics.clone())
            .from_block(query.from_block)
            .to_block(query.to_block);

        Ok(self.provider.get_logs(&filter).await?)
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<DateTime<Utc>, ChainClientError> {
        let block_id = BlockId::Number(BlockNumber::Number(U64::from(block_number)));
        let block = self
            .provider
            .get_block(block_id)
            .await?
            .ok_or(ChainClientError::MissingField("block"))?;

        to_timestamp(block.timestamp)
    }

    async fn auction_params(
        &self,
        cast_hash: &ContentRef,
    ) -> Result<AuctionParams, ChainClientError> {
        let (min_bid, min_bid_increment_bps, protocol_fee_bps, duration, extension, threshold) =
            self.auction_house
                .auction_params(cast_hash.to_bytes32())
                .call()
                .await
                .map_err(|e| ChainClientError::ContractCall(e.to_string()))?;

        Ok(AuctionParams {
            min_bid: to_amount(min_bid)?,
            min_bid_increment_bps,
            protocol_fee_bps,
            duration_secs: duration,
            extension_secs: extension,
            extension_threshold_secs: threshold,
        })
    }
}

pub fn parse_address(raw: &str) -> Result<Address, ChainClientError> {
    Address::from_str(raw.trim())
        .map_err(|e| ChainClientError::ConfigError(format!("Invalid address {}: {}", raw, e)))
}
