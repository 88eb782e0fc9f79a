use dlink_ledger::{ExecutorError, LedgerError};

/// Errors produced while opening a ledger subscription.
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// The ledger refused or failed the registration.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The blocking executor failed to run the registration.
    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),
}

/// Convenience alias used throughout the fabric crate.
pub type Result<T> = std::result::Result<T, FabricError>;
