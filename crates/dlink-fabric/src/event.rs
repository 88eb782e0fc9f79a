use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use dlink_ledger::EventStream;
use dlink_types::{EventKind, LedgerEvent};

/// One event from either of the two merged ledger subscriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultiEvent {
    NewLaunch(LedgerEvent),
    NewDevices(LedgerEvent),
}

impl MultiEvent {
    pub fn new(kind: EventKind, event: LedgerEvent) -> Self {
        match kind {
            EventKind::NewLaunch => Self::NewLaunch(event),
            EventKind::NewDevices => Self::NewDevices(event),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewLaunch(_) => EventKind::NewLaunch,
            Self::NewDevices(_) => EventKind::NewDevices,
        }
    }

    pub fn event(&self) -> &LedgerEvent {
        match self {
            Self::NewLaunch(e) | Self::NewDevices(e) => e,
        }
    }

    pub fn into_event(self) -> LedgerEvent {
        match self {
            Self::NewLaunch(e) | Self::NewDevices(e) => e,
        }
    }
}

/// The two per-kind ledger streams read as one.
pub struct MultiEventStream {
    launches: EventStream,
    devices: EventStream,
}

impl MultiEventStream {
    pub fn new(launches: EventStream, devices: EventStream) -> Self {
        Self { launches, devices }
    }

    /// Next event from either stream.
    ///
    /// Returns `None` as soon as either upstream closes; the caller re-opens
    /// both. Lagged receivers skip the missed events and keep reading.
    pub async fn next(&mut self) -> Option<MultiEvent> {
        loop {
            let (kind, received) = tokio::select! {
                r = self.launches.recv() => (EventKind::NewLaunch, r),
                r = self.devices.recv() => (EventKind::NewDevices, r),
            };
            match received {
                Ok(event) => return Some(MultiEvent::new(kind, event)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%kind, skipped, "ledger subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
