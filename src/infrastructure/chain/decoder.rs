//! Raw log to domain event decoding

use chrono::{DateTime, TimeZone, Utc};
use ethers::abi::RawLog;
use ethers::contract::EthEvent;
use ethers::types::{Address, Log, H256, U256};

use super::abi::{
    AuctionCancelledEvent, AuctionExtendedEvent, AuctionRecoveredEvent, AuctionSettledEvent,
    AuctionStartedEvent, BidPlacedEvent, CollectibleTransferEvent,
};
use super::error::ChainClientError;
use crate::domain::models::{
    AuctionEvent, ChainEvent, ContentRef, DecodedEvent, EventMeta, EventStream, TransferEvent,
};

/// Decode a log fetched for `stream`
pub fn decode_log(stream: EventStream, log: &Log) -> Result<DecodedEvent, ChainClientError> {
    let meta = event_meta(log)?;
    let topic0 = log
        .topics
        .first()
        .copied()
        .ok_or(ChainClientError::MissingField("topic0"))?;

    let raw_log = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };

    let event = match stream {
        EventStream::Auctions => ChainEvent::Auction(decode_auction_event(topic0, &raw_log)?),
        EventStream::Transfers => {
            if topic0 != CollectibleTransferEvent::signature() {
                return Err(unknown_topic(topic0));
            }
            let transfer = CollectibleTransferEvent::decode_log(&raw_log)?;
            ChainEvent::Transfer(TransferEvent {
                from: format_address(&transfer.from),
                to: format_address(&transfer.to),
                token_id: transfer.token_id.to_string(),
            })
        }
    };

    Ok(DecodedEvent { meta, event })
}

fn decode_auction_event(topic0: H256, raw_log: &RawLog) -> Result<AuctionEvent, ChainClientError> {
    if topic0 == AuctionStartedEvent::signature() {
        let e = AuctionStartedEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::Started {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
            creator: format_address(&e.creator),
            creator_fid: to_u64(e.creator_fid, "creatorFid")?,
            end_time: to_timestamp(e.end_time)?,
        });
    }
    if topic0 == BidPlacedEvent::signature() {
        let e = BidPlacedEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::BidPlaced {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
            bidder: format_address(&e.bidder),
            bidder_fid: to_u64(e.bidder_fid, "bidderFid")?,
            amount: to_amount(e.amount)?,
        });
    }
    if topic0 == AuctionSettledEvent::signature() {
        let e = AuctionSettledEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::Settled {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
            winner: format_address(&e.winner),
            winner_fid: to_u64(e.winner_fid, "winnerFid")?,
            amount: to_amount(e.amount)?,
        });
    }
    if topic0 == AuctionExtendedEvent::signature() {
        let e = AuctionExtendedEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::Extended {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
            new_end_time: to_timestamp(e.new_end_time)?,
        });
    }
    if topic0 == AuctionCancelledEvent::signature() {
        let e = AuctionCancelledEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::Cancelled {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
        });
    }
    if topic0 == AuctionRecoveredEvent::signature() {
        let e = AuctionRecoveredEvent::decode_log(raw_log)?;
        return Ok(AuctionEvent::Recovered {
            cast_hash: ContentRef::from_bytes32(&e.cast_hash),
        });
    }
    Err(unknown_topic(topic0))
}

fn event_meta(log: &Log) -> Result<EventMeta, ChainClientError> {
    let tx_hash = log
        .transaction_hash
        .ok_or(ChainClientError::MissingField("transactionHash"))?;
    let block_number = log
        .block_number
        .ok_or(ChainClientError::MissingField("blockNumber"))?;
    let log_index = log
        .log_index
        .ok_or(ChainClientError::MissingField("logIndex"))?;

    Ok(EventMeta {
        tx_hash: format!("{:#x}", tx_hash),
        block_number: block_number.as_u64(),
        log_index: to_u64(log_index, "logIndex")?,
    })
}

fn unknown_topic(topic0: H256) -> ChainClientError {
    ChainClientError::DecodeError(format!("Unknown event topic {:#x}", topic0))
}

/// Lowercase `0x`-prefixed address
pub fn format_address(address: &Address) -> String {
    format!("{:#x}", address)
}

pub fn to_u64(value: U256, field: &str) -> Result<u64, ChainClientError> {
    if value > U256::from(u64::MAX) {
        return Err(ChainClientError::DecodeError(format!(
            "{} does not fit in 64 bits: {}",
            field, value
        )));
    }
    Ok(value.as_u64())
}

/// Token amounts are stored as signed 64-bit base units
pub fn to_amount(value: U256) -> Result<i64, ChainClientError> {
    if value > U256::from(i64::MAX as u64) {
        return Err(ChainClientError::DecodeError(format!(
            "Amount out of range: {}",
            value
        )));
    }
    Ok(value.as_u64() as i64)
}

pub fn to_timestamp(value: U256) -> Result<DateTime<Utc>, ChainClientError> {
    let secs = to_u64(value, "timestamp")?;
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| ChainClientError::DecodeError(format!("Invalid timestamp: {}", secs)))
}
