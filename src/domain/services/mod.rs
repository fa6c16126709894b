pub mod analytics;
pub mod auction_lifecycle;
pub mod identity;
pub mod transfer_classifier;

pub use identity::{InvalidIdentifier, UserIdentifier};
pub use transfer_classifier::TransferClassifier;
