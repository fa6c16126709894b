use std::error::Error;
use std::fmt;

use crate::infrastructure::chain::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Error that aborts the current sync run of one stream
///
/// Either kind leaves the stream's cursor where it was; the next run retries
/// the same window.
#[derive(Debug)]
pub enum SyncError {
    /// RPC unavailable or returned garbage for a whole window
    Transport(ChainClientError),
    /// Store unavailable while projecting or advancing the cursor
    Store(DbError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Transport(e) => write!(f, "Chain transport error: {}", e),
            SyncError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SyncError::Transport(e) => Some(e),
            SyncError::Store(e) => Some(e),
        }
    }
}

impl From<ChainClientError> for SyncError {
    fn from(error: ChainClientError) -> Self {
        SyncError::Transport(error)
    }
}

impl From<DbError> for SyncError {
    fn from(error: DbError) -> Self {
        SyncError::Store(error)
    }
}

/// Rejected lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The auction already reached a terminal state
    AlreadyTerminal { current: String, requested: String },
    /// `Active` is only ever the initial state
    InvalidTarget(String),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::AlreadyTerminal { current, requested } => write!(
                f,
                "Auction is already {}, cannot move to {}",
                current, requested
            ),
            LifecycleError::InvalidTarget(state) => {
                write!(f, "{} is not a valid transition target", state)
            }
        }
    }
}

impl Error for LifecycleError {}
