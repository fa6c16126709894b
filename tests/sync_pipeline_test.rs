use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ethers::abi::{encode, Token};
use ethers::contract::EthEvent;
use ethers::types::{Address, Bytes, Log, H256, U256, U64};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cast_auction_indexer::application::analytics::{AnalyticsError, AnalyticsService};
use cast_auction_indexer::application::indexer::{
    EventProjector, LogFetcher, RetryHandler, SyncRunner,
};
use cast_auction_indexer::config::{
    AppConfig, CacheConfig, ChainConfig, DatabaseConfig, IndexerConfig, ProfileApiConfig,
};
use cast_auction_indexer::domain::models::{AuctionParams, AuctionState, ContentRef, EventStream};
use cast_auction_indexer::domain::services::analytics::{usd_units, TimeWindow};
use cast_auction_indexer::domain::services::TransferClassifier;
use cast_auction_indexer::infrastructure::chain::abi::{
    AuctionSettledEvent, AuctionStartedEvent, BidPlacedEvent, CollectibleTransferEvent,
};
use cast_auction_indexer::infrastructure::chain::{
    ChainClient, ChainClientError, ContractAddresses, LogQuery,
};
use cast_auction_indexer::infrastructure::persistence::{DbPool, RepositoryFactory, Repositories};
use migration::{Migrator, MigratorTrait};

const GENESIS_SECS: i64 = 1_767_225_600;
const FAR_FUTURE_SECS: u64 = 4_000_000_000;

fn auction_contract() -> Address {
    Address::repeat_byte(0xaa)
}

fn collectible_contract() -> Address {
    Address::repeat_byte(0xcc)
}

fn addresses() -> ContractAddresses {
    ContractAddresses {
        auction: auction_contract(),
        collectible: collectible_contract(),
    }
}

fn cast_topic(seed: u8) -> H256 {
    let mut bytes = [0u8; 32];
    bytes[..20].copy_from_slice(&[seed; 20]);
    H256::from(bytes)
}

fn cast_ref(seed: u8) -> ContentRef {
    ContentRef::from_bytes32(cast_topic(seed).as_fixed_bytes())
}

fn wallet(fid: u64) -> Address {
    Address::from_low_u64_be(0x1000 + fid)
}

fn raw_log(address: Address, topics: Vec<H256>, data: Vec<u8>, block: u64, log_index: u64) -> Log {
    Log {
        address,
        topics,
        data: Bytes::from(data),
        block_number: Some(U64::from(block)),
        log_index: Some(U256::from(log_index)),
        transaction_hash: Some(H256::from_low_u64_be(block * 1_000 + log_index)),
        ..Default::default()
    }
}

fn started(seed: u8, creator_fid: u64, block: u64, log_index: u64) -> Log {
    raw_log(
        auction_contract(),
        vec![
            AuctionStartedEvent::signature(),
            cast_topic(seed),
            H256::from(wallet(creator_fid)),
        ],
        encode(&[
            Token::Uint(U256::from(creator_fid)),
            Token::Uint(U256::from(FAR_FUTURE_SECS)),
        ]),
        block,
        log_index,
    )
}

fn bid(seed: u8, bidder_fid: u64, dollars: i64, block: u64, log_index: u64) -> Log {
    raw_log(
        auction_contract(),
        vec![
            BidPlacedEvent::signature(),
            cast_topic(seed),
            H256::from(wallet(bidder_fid)),
        ],
        encode(&[
            Token::Uint(U256::from(bidder_fid)),
            Token::Uint(U256::from(usd_units(dollars) as u64)),
        ]),
        block,
        log_index,
    )
}

fn settled(seed: u8, winner_fid: u64, dollars: i64, block: u64, log_index: u64) -> Log {
    raw_log(
        auction_contract(),
        vec![
            AuctionSettledEvent::signature(),
            cast_topic(seed),
            H256::from(wallet(winner_fid)),
        ],
        encode(&[
            Token::Uint(U256::from(winner_fid)),
            Token::Uint(U256::from(usd_units(dollars) as u64)),
        ]),
        block,
        log_index,
    )
}

fn transfer(from: Address, to: Address, token_id: u64, block: u64, log_index: u64) -> Log {
    raw_log(
        collectible_contract(),
        vec![
            CollectibleTransferEvent::signature(),
            H256::from(from),
            H256::from(to),
            H256::from_low_u64_be(token_id),
        ],
        vec![],
        block,
        log_index,
    )
}

/// In-memory chain serving a fixed log set
struct MockChain {
    head: AtomicU64,
    logs: Mutex<Vec<Log>>,
    failing_params: HashSet<ContentRef>,
    param_calls: AtomicUsize,
    /// `get_logs` for this contract fails once a window reaches the block
    failing_logs_from: Option<(Address, u64)>,
}

impl MockChain {
    fn new(head: u64, logs: Vec<Log>) -> Self {
        Self {
            head: AtomicU64::new(head),
            logs: Mutex::new(logs),
            failing_params: HashSet::new(),
            param_calls: AtomicUsize::new(0),
            failing_logs_from: None,
        }
    }

    fn failing_logs_from(mut self, contract: Address, block: u64) -> Self {
        self.failing_logs_from = Some((contract, block));
        self
    }

    fn failing_params_for(mut self, cast_hash: ContentRef) -> Self {
        self.failing_params.insert(cast_hash);
        self
    }

    fn advance_head(&self, head: u64, logs: Vec<Log>) {
        self.head.store(head, Ordering::SeqCst);
        self.logs.lock().unwrap().extend(logs);
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn block_number(&self) -> Result<u64, ChainClientError> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<Log>, ChainClientError> {
        if let Some((contract, block)) = self.failing_logs_from {
            if query.address == contract && query.to_block >= block {
                return Err(ChainClientError::ContractCall(
                    "eth_getLogs: connection reset".to_string(),
                ));
            }
        }
        let logs = self.logs.lock().unwrap();
        Ok(logs
            .iter()
            .filter(|log| log.address == query.address)
            .filter(|log| {
                log.topics
                    .first()
                    .map(|topic0| query.topics.contains(topic0))
                    .unwrap_or(false)
            })
            .filter(|log| {
                let block = log.block_number.map(|b| b.as_u64()).unwrap_or_default();
                block >= query.from_block && block <= query.to_block
            })
            .cloned()
            .collect())
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<DateTime<Utc>, ChainClientError> {
        Ok(Utc
            .timestamp_opt(GENESIS_SECS + block_number as i64 * 2, 0)
            .unwrap())
    }

    async fn auction_params(
        &self,
        cast_hash: &ContentRef,
    ) -> Result<AuctionParams, ChainClientError> {
        self.param_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_params.contains(cast_hash) {
            return Err(ChainClientError::ContractCall("execution reverted".to_string()));
        }
        Ok(AuctionParams {
            min_bid: usd_units(1),
            min_bid_increment_bps: 1_000,
            protocol_fee_bps: 500,
            duration_secs: 86_400,
            extension_secs: 900,
            extension_threshold_secs: 900,
        })
    }
}

fn test_config(start_block: u64) -> AppConfig {
    AppConfig {
        chain: ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            auction_contract: format!("{:#x}", auction_contract()),
            collectible_contract: format!("{:#x}", collectible_contract()),
            auction_start_block: start_block,
            collectible_start_block: start_block,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        indexer: IndexerConfig {
            batch_size: 10,
            window_delay_ms: 0,
            sync_interval_ms: 1_000,
            read_through_retries: 1,
        },
        profile_api: ProfileApiConfig {
            url: String::new(),
            api_key: String::new(),
            cache_ttl_secs: 60,
        },
        cache: CacheConfig { result_ttl_secs: 60 },
    }
}

async fn setup_store() -> Repositories {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let connection = Database::connect(options).await.unwrap();
    Migrator::up(&connection, None).await.unwrap();
    RepositoryFactory::create_repositories(&DbPool::from_connection(connection))
}

fn runner(chain: Arc<MockChain>, repositories: &Repositories, start_block: u64) -> SyncRunner {
    SyncRunner::new(chain, repositories.clone(), addresses(), &test_config(start_block))
}

/// One auction with three rising bids by fid 10, one settle, and three transfers
fn auction_history() -> Vec<Log> {
    vec![
        started(1, 7, 3, 0),
        bid(1, 10, 1, 4, 0),
        bid(1, 10, 2, 5, 0),
        bid(1, 10, 3, 5, 1),
        settled(1, 10, 3, 8, 0),
        transfer(Address::zero(), wallet(10), 1, 9, 0),
        transfer(wallet(10), wallet(11), 1, 12, 0),
        transfer(wallet(11), auction_contract(), 1, 13, 0),
    ]
}

#[tokio::test]
async fn test_full_sync_projects_every_stream() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(20, auction_history()));

    let report = runner(chain, &repositories, 1).run_sync().await;
    assert!(report.is_success());
    assert_eq!(report.head_block, Some(20));

    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert_eq!(auctions.final_cursor, 20);
    assert_eq!(auctions.projection.applied, 5);

    let auction = repositories
        .auction
        .find_by_cast_hash(&cast_ref(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(auction.state, AuctionState::Settled);
    assert_eq!(auction.creator_fid, 7);
    assert_eq!(auction.params.protocol_fee_bps, 500);
    let winner = auction.winner.unwrap();
    assert_eq!(winner.fid, 10);
    assert_eq!(winner.amount, usd_units(3));

    let bids = repositories.bid.find_by_auction(auction.id).await.unwrap();
    let amounts: Vec<i64> = bids.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![usd_units(1), usd_units(2), usd_units(3)]);

    let transfers = report.stream(EventStream::Transfers).unwrap();
    assert_eq!(transfers.projection.applied, 1);
    assert_eq!(transfers.projection.discarded, 2);
    assert_eq!(repositories.transfer.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_replaying_a_window_writes_nothing_new() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(20, auction_history()));
    let fetcher = LogFetcher::new(chain.clone(), addresses());
    let projector = EventProjector::new(
        chain.clone(),
        repositories.clone(),
        TransferClassifier::new(&format!("{:#x}", auction_contract())),
        RetryHandler::with_config(1, 10),
    );

    let window = fetcher.fetch_logs(EventStream::Auctions, 1, 20).await.unwrap();
    let first = projector
        .project_window(EventStream::Auctions, &window.events)
        .await
        .unwrap();
    assert_eq!(first.applied, 5);

    let second = projector
        .project_window(EventStream::Auctions, &window.events)
        .await
        .unwrap();
    assert_eq!(second.applied, 0);
    assert_eq!(second.duplicates, 5);

    assert_eq!(repositories.auction.count().await.unwrap(), 1);
    assert_eq!(repositories.bid.count().await.unwrap(), 3);
    assert_eq!(chain.param_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_window_projected_before_cursor_commit_is_replayed_cleanly() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(20, auction_history()));

    // Writes landed but the cursor never advanced
    let fetcher = LogFetcher::new(chain.clone(), addresses());
    let projector = EventProjector::new(
        chain.clone(),
        repositories.clone(),
        TransferClassifier::new(&format!("{:#x}", auction_contract())),
        RetryHandler::with_config(1, 10),
    );
    let window = fetcher.fetch_logs(EventStream::Auctions, 1, 10).await.unwrap();
    projector
        .project_window(EventStream::Auctions, &window.events)
        .await
        .unwrap();
    assert_eq!(repositories.cursor.get(EventStream::Auctions).await.unwrap(), 0);

    let report = runner(chain, &repositories, 1).run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert_eq!(auctions.projection.applied, 0);
    assert_eq!(auctions.projection.duplicates, 5);
    assert_eq!(auctions.final_cursor, 20);

    assert_eq!(repositories.auction.count().await.unwrap(), 1);
    assert_eq!(repositories.bid.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_bid_for_unknown_auction_is_dropped() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(10, vec![bid(9, 10, 5, 2, 0)]));

    let report = runner(chain, &repositories, 1).run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert!(auctions.is_success());
    assert_eq!(auctions.projection.orphans, 1);
    assert_eq!(auctions.final_cursor, 10);
    assert_eq!(repositories.bid.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_parameter_read_drops_the_start() {
    let repositories = setup_store().await;
    let chain = Arc::new(
        MockChain::new(
            10,
            vec![started(2, 7, 2, 0), bid(2, 10, 1, 3, 0), started(3, 8, 4, 0)],
        )
        .failing_params_for(cast_ref(2)),
    );

    let report = runner(chain, &repositories, 1).run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert!(auctions.is_success());
    assert_eq!(auctions.projection.dropped_starts, 1);
    assert_eq!(auctions.projection.orphans, 1);
    assert_eq!(auctions.projection.applied, 1);
    assert_eq!(auctions.final_cursor, 10);

    assert!(repositories
        .auction
        .find_by_cast_hash(&cast_ref(2))
        .await
        .unwrap()
        .is_none());
    assert!(repositories
        .auction
        .find_by_cast_hash(&cast_ref(3))
        .await
        .unwrap()
        .is_some());
}

/// BidPlaced log whose amount does not fit the store's amount column
fn oversized_bid(seed: u8, bidder_fid: u64, block: u64, log_index: u64) -> Log {
    raw_log(
        auction_contract(),
        vec![
            BidPlacedEvent::signature(),
            cast_topic(seed),
            H256::from(wallet(bidder_fid)),
        ],
        encode(&[Token::Uint(U256::from(bidder_fid)), Token::Uint(U256::MAX)]),
        block,
        log_index,
    )
}

#[tokio::test]
async fn test_transport_failure_stops_only_the_failing_stream() {
    let repositories = setup_store().await;
    let chain = Arc::new(
        MockChain::new(
            25,
            vec![
                started(1, 7, 3, 0),
                bid(1, 10, 1, 4, 0),
                bid(1, 11, 2, 16, 0),
                transfer(wallet(10), wallet(11), 1, 12, 0),
                transfer(wallet(11), wallet(12), 1, 22, 0),
            ],
        )
        .failing_logs_from(auction_contract(), 15),
    );

    let report = runner(chain, &repositories, 1).run_sync().await;
    assert!(!report.is_success());

    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert!(auctions.error.is_some());
    assert_eq!(auctions.windows_committed, 1);
    assert_eq!(auctions.final_cursor, 10);
    assert_eq!(repositories.cursor.get(EventStream::Auctions).await.unwrap(), 10);
    // Only the committed window was projected
    assert_eq!(repositories.bid.count().await.unwrap(), 1);

    let transfers = report.stream(EventStream::Transfers).unwrap();
    assert!(transfers.is_success());
    assert_eq!(transfers.final_cursor, 25);
    assert_eq!(transfers.projection.applied, 2);
    assert_eq!(repositories.cursor.get(EventStream::Transfers).await.unwrap(), 25);
}

#[tokio::test]
async fn test_undecodable_log_is_skipped_and_the_rest_applied() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(
        10,
        vec![
            started(1, 7, 2, 0),
            bid(1, 10, 1, 3, 0),
            oversized_bid(1, 11, 3, 1),
            bid(1, 12, 2, 4, 0),
        ],
    ));

    let report = runner(chain, &repositories, 1).run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert!(auctions.is_success());
    assert_eq!(auctions.events_fetched, 4);
    assert_eq!(auctions.decode_failures, 1);
    assert_eq!(auctions.projection.applied, 3);
    assert_eq!(auctions.final_cursor, 10);

    let auction = repositories
        .auction
        .find_by_cast_hash(&cast_ref(1))
        .await
        .unwrap()
        .unwrap();
    let bids = repositories.bid.find_by_auction(auction.id).await.unwrap();
    let bidders: Vec<u64> = bids.iter().map(|b| b.bidder_fid).collect();
    assert_eq!(bidders, vec![10, 12]);
}

#[tokio::test]
async fn test_cursor_starts_at_start_block_and_only_moves_forward() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(125, vec![started(1, 7, 90, 0)]));
    let runner = runner(chain.clone(), &repositories, 100);

    let report = runner.run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert_eq!(auctions.start_cursor, 0);
    assert_eq!(auctions.windows_committed, 3);
    assert_eq!(auctions.final_cursor, 125);
    // Below the start block, never scanned
    assert_eq!(repositories.auction.count().await.unwrap(), 0);

    chain.advance_head(130, vec![started(4, 7, 128, 0)]);
    let report = runner.run_sync().await;
    let auctions = report.stream(EventStream::Auctions).unwrap();
    assert_eq!(auctions.start_cursor, 125);
    assert_eq!(auctions.windows_committed, 1);
    assert_eq!(auctions.final_cursor, 130);
    assert_eq!(repositories.auction.count().await.unwrap(), 1);

    repositories
        .cursor
        .set(EventStream::Auctions, 50)
        .await
        .unwrap();
    assert_eq!(repositories.cursor.get(EventStream::Auctions).await.unwrap(), 130);

    let report = runner.run_sync().await;
    assert_eq!(
        report.stream(EventStream::Auctions).unwrap().windows_committed,
        0
    );
}

#[tokio::test]
async fn test_volume_uses_the_highest_bid_per_auction() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(20, auction_history()));
    runner(chain, &repositories, 1).run_sync().await;

    let analytics = AnalyticsService::new(repositories.clone(), None, 60);

    let stats = analytics.user_stats("10").await.unwrap();
    assert_eq!(stats.total_bids, 3);
    assert_eq!(stats.total_volume, Decimal::new(3, 0));
    assert_eq!(stats.highest_bid, Decimal::new(3, 0));
    assert_eq!(stats.auctions_won, 1);
    assert_eq!(stats.rank, Some(1));
    assert_eq!(stats.percentile, Some(100));

    let global = analytics.global_stats().await.unwrap();
    assert_eq!(global.total_auctions, 1);
    assert_eq!(global.settled_auctions, 1);
    assert_eq!(global.active_auctions, 0);
    assert_eq!(global.total_bids, 3);
    assert_eq!(global.unique_bidders, 1);
    assert_eq!(global.total_volume, Decimal::new(3, 0));
    assert_eq!(global.p2p_transfers, 1);

    let board = analytics.leaderboard(TimeWindow::AllTime, 10).await.unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].fid, 10);
    assert_eq!(board.entries[0].total_volume, Decimal::new(3, 0));

    let creators = analytics.creator_leaderboard(10).await.unwrap();
    assert_eq!(creators[0].creator_fid, 7);
    assert_eq!(creators[0].revenue, Decimal::new(3, 0));
}

#[tokio::test]
async fn test_rivalries_and_head_to_head_from_projected_bids() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(
        20,
        vec![
            started(1, 7, 2, 0),
            bid(1, 10, 1, 3, 0),
            bid(1, 11, 2, 4, 0),
            bid(1, 10, 4, 5, 0),
        ],
    ));
    runner(chain, &repositories, 1).run_sync().await;

    let analytics = AnalyticsService::new(repositories.clone(), None, 60);

    let report = analytics.rivalries("11").await.unwrap();
    assert_eq!(report.times_outbid, 1);
    assert_eq!(report.times_outbidding, 1);
    assert_eq!(report.biggest_rival.unwrap().fid, 10);

    let h2h = analytics.compare_users("10", "11").await.unwrap();
    assert_eq!(h2h.common_auctions, vec![1]);
}

#[tokio::test]
async fn test_auction_lookup_and_identifier_errors() {
    let repositories = setup_store().await;
    let chain = Arc::new(MockChain::new(20, auction_history()));
    runner(chain, &repositories, 1).run_sync().await;

    // No API key configured, so no profile provider
    let analytics = AnalyticsService::from_config(repositories.clone(), &test_config(1)).unwrap();

    // Full bytes32 form resolves to the same auction
    let padded = format!("{:#x}", cast_topic(1));
    let view = analytics.auction(&padded).await.unwrap();
    assert_eq!(view.bids.len(), 3);
    assert_eq!(view.highest_bid, Some(Decimal::new(3, 0)));
    assert!(view.metadata.is_none());

    let missing = analytics.auction(cast_ref(2).as_str()).await.unwrap_err();
    assert!(matches!(missing, AnalyticsError::NotFound(_)));
    assert!(missing.is_client_error());

    let invalid = analytics.user_stats("not a user!").await.unwrap_err();
    assert!(matches!(invalid, AnalyticsError::InvalidIdentifier(_)));

    let unresolvable = analytics.user_stats("@alice").await.unwrap_err();
    assert!(matches!(unresolvable, AnalyticsError::Internal(_)));
}
