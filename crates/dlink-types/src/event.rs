use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Upstream ledger event kinds the bridge subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A launch request was sent to some target address.
    NewLaunch,
    /// The device list of a delegated-access subscription changed.
    NewDevices,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NewLaunch => "NewLaunch",
            Self::NewDevices => "NewDevices",
        };
        write!(f, "{s}")
    }
}

/// Payload carried by a ledger event.
///
/// The shape of the payload, not the event kind, decides how the bridge routes
/// the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// A single address (launch target).
    Text(String),
    /// A list of addresses (device list).
    List(Vec<String>),
}

impl EventPayload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

/// A single event delivered by a ledger subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Address of the account that triggered the event.
    pub source: Address,
    pub payload: EventPayload,
}

impl LedgerEvent {
    pub fn new(source: impl Into<Address>, payload: EventPayload) -> Self {
        Self {
            source: source.into(),
            payload,
        }
    }

    pub fn text(source: impl Into<Address>, target: impl Into<String>) -> Self {
        Self::new(source, EventPayload::Text(target.into()))
    }

    pub fn list<I, S>(source: impl Into<Address>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            source,
            EventPayload::List(items.into_iter().map(Into::into).collect()),
        )
    }
}
