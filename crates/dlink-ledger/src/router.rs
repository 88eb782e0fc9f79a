use std::sync::RwLock;

use tokio::sync::broadcast;

use dlink_types::{EventKind, LedgerEvent};

/// A broadcast channel receiver for ledger events of one kind.
pub type EventStream = broadcast::Receiver<LedgerEvent>;

/// Internal subscriber: an event kind paired with a broadcast sender.
struct Subscriber {
    kind: EventKind,
    sender: broadcast::Sender<LedgerEvent>,
}

/// Fan-out router that delivers events to the subscribers of their kind.
pub struct EventRouter {
    subscribers: RwLock<Vec<Subscriber>>,
    capacity: usize,
}

impl EventRouter {
    /// Create a router whose per-subscriber channels hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new subscriber for `kind`.
    pub fn subscribe(&self, kind: EventKind) -> EventStream {
        let (tx, rx) = broadcast::channel(self.capacity);
        self.subscribers
            .write()
            .expect("router lock poisoned")
            .push(Subscriber { kind, sender: tx });
        rx
    }

    /// Route an event to all subscribers of `kind`.
    /// Subscribers whose receivers are gone are pruned.
    /// Returns the number of subscribers the event reached.
    pub fn route(&self, kind: EventKind, event: &LedgerEvent) -> usize {
        let mut delivered = 0;
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        subs.retain(|sub| {
            if sub.kind == kind {
                let alive = sub.sender.send(event.clone()).is_ok();
                if alive {
                    delivered += 1;
                }
                alive
            } else {
                sub.sender.receiver_count() > 0
            }
        });
        delivered
    }

    /// Drop every subscriber, closing their streams.
    pub fn close_all(&self) -> usize {
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        let count = subs.len();
        subs.clear();
        count
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("router lock poisoned")
            .len()
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(1024)
    }
}
