//! Ledger SDK boundary for dlink.
//!
//! [`LedgerClient`] is the blocking, object-safe surface the bridge consumes:
//! account construction, datalog recording (optionally under a
//! delegated-access relationship), delegated-device listing, and per-kind
//! event subscriptions. [`InMemoryLedger`] implements it for tests, local
//! simulation, and embedding.
//!
//! Because every SDK call may block, async code reaches the ledger through a
//! [`BlockingExecutor`]; [`WorkerPool`] is the tokio-backed implementation.

pub mod error;
pub mod executor;
pub mod memory;
pub mod records;
pub mod router;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use executor::{BlockingExecutor, ExecutorError, WorkerPool};
pub use memory::InMemoryLedger;
pub use records::DatalogRecord;
pub use router::{EventRouter, EventStream};
pub use traits::{Account, LedgerClient};
