//! Event fabric for dlink.
//!
//! Merges the `NewLaunch` and `NewDevices` ledger subscriptions into a single
//! [`MultiEvent`] stream, classifies each event by payload shape and source
//! address, and spawns exactly one of two host handlers for it. The
//! subscription is re-opened forever on failure, paced by a [`RetryStrategy`].

pub mod dispatch;
pub mod error;
pub mod event;
pub mod retry;
pub mod subscriber;

pub use dispatch::{handler_fn, EventHandler, Handlers, Route, RouteTable};
pub use error::{FabricError, Result};
pub use event::{MultiEvent, MultiEventStream};
pub use retry::{FixedDelay, RetryStrategy};
pub use subscriber::{EventSubscriber, SubscriptionHandle};
