//! Auction lifecycle rules
//!
//! Active is the only non-terminal stored state. `Ended` is a read-time view of an
//! active auction whose end time has passed; it is never written. Bids are accepted
//! regardless of that view: the indexer records what happened on chain.

use chrono::{DateTime, Utc};

use crate::domain::errors::LifecycleError;
use crate::domain::models::{AuctionState, EffectiveState};

/// Result of checking a requested state write against the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The write moves the auction forward
    Apply,
    /// Replay of a transition that already happened
    NoOp,
    Rejected(LifecycleError),
}

/// State shown to readers at `now`
pub fn effective_state(
    stored: AuctionState,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EffectiveState {
    match stored {
        AuctionState::Active if now >= end_time => EffectiveState::Ended,
        AuctionState::Active => EffectiveState::Active,
        AuctionState::Settled => EffectiveState::Settled,
        AuctionState::Cancelled => EffectiveState::Cancelled,
        AuctionState::Recovered => EffectiveState::Recovered,
    }
}

/// Strict validation: only an active auction may take a terminal transition
pub fn validate_transition(
    current: AuctionState,
    target: AuctionState,
) -> Result<(), LifecycleError> {
    if !target.is_terminal() {
        return Err(LifecycleError::InvalidTarget(target.to_string()));
    }
    if current.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal {
            current: current.to_string(),
            requested: target.to_string(),
        });
    }
    Ok(())
}

/// Replay-tolerant planning used by the projector
pub fn plan_transition(current: AuctionState, target: AuctionState) -> TransitionOutcome {
    if current == target && current.is_terminal() {
        return TransitionOutcome::NoOp;
    }
    match validate_transition(current, target) {
        Ok(()) => TransitionOutcome::Apply,
        Err(e) => TransitionOutcome::Rejected(e),
    }
}

/// End time may only move forward, and only while the auction is open
pub fn can_extend(
    current: AuctionState,
    current_end: DateTime<Utc>,
    new_end: DateTime<Utc>,
) -> bool {
    !current.is_terminal() && new_end > current_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_ended_is_derived_from_end_time() {
        let end = at(100);
        assert_eq!(
            effective_state(AuctionState::Active, end, at(50)),
            EffectiveState::Active
        );
        assert_eq!(
            effective_state(AuctionState::Active, end, at(100)),
            EffectiveState::Ended
        );
        assert_eq!(
            effective_state(AuctionState::Settled, end, at(50)),
            EffectiveState::Settled
        );
    }

    #[test]
    fn test_terminal_states_reject_further_transitions() {
        for terminal in [
            AuctionState::Settled,
            AuctionState::Cancelled,
            AuctionState::Recovered,
        ] {
            assert!(validate_transition(AuctionState::Active, terminal).is_ok());
            assert!(matches!(
                validate_transition(terminal, AuctionState::Settled),
                Err(LifecycleError::AlreadyTerminal { .. })
            ));
        }
        assert_eq!(
            validate_transition(AuctionState::Settled, AuctionState::Active),
            Err(LifecycleError::InvalidTarget("active".to_string()))
        );
    }

    #[test]
    fn test_replayed_transition_is_a_no_op() {
        assert_eq!(
            plan_transition(AuctionState::Settled, AuctionState::Settled),
            TransitionOutcome::NoOp
        );
        assert_eq!(
            plan_transition(AuctionState::Active, AuctionState::Settled),
            TransitionOutcome::Apply
        );
        assert!(matches!(
            plan_transition(AuctionState::Cancelled, AuctionState::Settled),
            TransitionOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_extension_only_moves_forward() {
        let end = at(100);
        assert!(can_extend(AuctionState::Active, end, end + Duration::seconds(60)));
        assert!(!can_extend(AuctionState::Active, end, end - Duration::seconds(1)));
        assert!(!can_extend(AuctionState::Settled, end, end + Duration::seconds(60)));
    }
}
