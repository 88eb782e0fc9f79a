//! Host-facing SDK for dlink.
//!
//! [`Bridge`] is the single entry point a host application embeds: it keeps
//! the ledger event subscription alive, routes events to the host's
//! handlers, and submits state and credential datalogs through their lanes.
//! [`BridgeConfig`] loads the identities and timings from TOML, and
//! [`telemetry::init`] installs the process-wide log subscriber.

pub mod bridge;
pub mod config;
pub mod error;
pub mod telemetry;

pub use bridge::{Bridge, BridgeAddresses};
pub use config::{BridgeConfig, IdentityConfig, LoggingConfig};
pub use error::{SdkError, SdkResult};

// Re-export the types hosts touch directly.
pub use dlink_fabric::{handler_fn, EventHandler, SubscriptionHandle};
pub use dlink_ledger::{InMemoryLedger, LedgerClient};
pub use dlink_types::{Address, EventPayload, LedgerEvent, ReceiptHash};
