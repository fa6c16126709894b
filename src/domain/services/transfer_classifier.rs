//! Peer-to-peer transfer classification
//!
//! A collectible transfer is peer-to-peer unless it is a mint, a burn, or moves
//! through the auction contract. Address comparisons ignore case.

use crate::domain::models::TransferEvent;

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone)]
pub struct TransferClassifier {
    auction_contract: String,
}

impl TransferClassifier {
    pub fn new(auction_contract: &str) -> Self {
        Self {
            auction_contract: auction_contract.trim().to_string(),
        }
    }

    /// True when neither side is the zero address or the auction contract
    pub fn classify(&self, from: &str, to: &str) -> bool {
        ![from, to]
            .iter()
            .any(|side| self.is_excluded_party(side.trim()))
    }

    pub fn is_p2p(&self, transfer: &TransferEvent) -> bool {
        self.classify(&transfer.from, &transfer.to)
    }

    fn is_excluded_party(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(ZERO_ADDRESS)
            || address.eq_ignore_ascii_case(&self.auction_contract)
    }
}
