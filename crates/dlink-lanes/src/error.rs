use dlink_ledger::{ExecutorError, LedgerError};

/// Why a record submission or query did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("account construction failed: {0}")]
    Account(#[source] LedgerError),

    #[error("delegated access setup failed: {0}")]
    Delegation(#[source] LedgerError),

    #[error("datalog record failed: {0}")]
    Record(#[source] LedgerError),

    #[error("delegated devices query failed: {0}")]
    Query(#[source] LedgerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}
