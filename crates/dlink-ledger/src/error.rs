use dlink_crypto::KeyError;
use dlink_types::{Address, EventKind};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("account construction failed: {0}")]
    InvalidAccount(#[from] KeyError),

    #[error("{author} holds no delegated access under {owner}")]
    NotDelegated { author: Address, owner: Address },

    #[error("subscription to {kind} unavailable: {reason}")]
    SubscriptionUnavailable { kind: EventKind, reason: String },

    #[error("record rejected: {0}")]
    Rejected(String),

    #[error("ledger connection failed: {0}")]
    Connection(String),
}

/// Convenience alias used throughout the ledger crate.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
