pub mod analytics;
pub mod indexer;
