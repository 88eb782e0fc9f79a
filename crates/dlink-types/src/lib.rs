//! Foundation types for dlink.
//!
//! This crate provides the identity, event, and receipt types shared by every
//! other dlink crate.
//!
//! # Key Types
//!
//! - [`Identity`]: Signing credential (seed material + curve kind)
//! - [`Address`]: Ledger account address derived from an identity
//! - [`LedgerEvent`]: `(source, payload)` pair delivered by a subscription
//! - [`EventKind`]: Upstream ledger event kinds the bridge listens to
//! - [`ReceiptHash`]: Hash of a recorded datalog transaction

pub mod error;
pub mod event;
pub mod identity;
pub mod receipt;

pub use error::TypeError;
pub use event::{EventKind, EventPayload, LedgerEvent};
pub use identity::{Address, CurveKind, Identity};
pub use receipt::ReceiptHash;
