use thiserror::Error;

use dlink_ledger::{ExecutorError, LedgerError};
use dlink_types::TypeError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid identity: {0}")]
    Identity(#[from] TypeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("telemetry init failed: {0}")]
    Telemetry(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
