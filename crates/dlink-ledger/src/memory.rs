use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use dlink_crypto::ContentHasher;
use dlink_types::{Address, EventKind, LedgerEvent, ReceiptHash};

use crate::error::{LedgerError, LedgerResult};
use crate::records::DatalogRecord;
use crate::router::{EventRouter, EventStream};
use crate::traits::{Account, LedgerClient};

/// In-memory ledger for tests, local simulation, and embedding.
///
/// Stores datalog records per author, tracks delegated-access device lists,
/// and publishes `NewLaunch` / `NewDevices` events to subscribers.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    router: EventRouter,
}

#[derive(Default)]
struct LedgerState {
    records: Vec<DatalogRecord>,
    by_author: HashMap<Address, Vec<usize>>,
    devices: HashMap<Address, Vec<Address>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_channel_capacity(1024)
    }

    /// Ledger whose subscription channels buffer `capacity` events.
    pub fn with_channel_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            router: EventRouter::new(capacity),
        }
    }

    /// Replace the device list of `owner`'s delegated-access relationship
    /// and publish the matching `NewDevices` event.
    pub fn grant_devices(&self, owner: &Address, devices: Vec<Address>) -> LedgerEvent {
        let event = LedgerEvent::list(
            owner.clone(),
            devices.iter().map(|d| d.as_str().to_owned()),
        );
        self.inner
            .write()
            .expect("ledger lock poisoned")
            .devices
            .insert(owner.clone(), devices);
        self.emit(EventKind::NewDevices, event.clone());
        event
    }

    /// Publish a `NewLaunch` event sent by `sender` to `target`.
    pub fn launch(&self, sender: &Address, target: &Address) -> LedgerEvent {
        let event = LedgerEvent::text(sender.clone(), target.as_str());
        self.emit(EventKind::NewLaunch, event.clone());
        event
    }

    /// Publish an arbitrary event. Returns how many subscribers received it.
    pub fn emit(&self, kind: EventKind, event: LedgerEvent) -> usize {
        let delivered = self.router.route(kind, &event);
        debug!(%kind, source = %event.source.short(), delivered, "event emitted");
        delivered
    }

    /// Close every open subscription, as a dropped connection would.
    pub fn disconnect_subscribers(&self) -> usize {
        self.router.close_all()
    }

    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }

    /// All records signed by `author`, in append order.
    pub fn records_by(&self, author: &Address) -> Vec<DatalogRecord> {
        let state = self.inner.read().expect("ledger lock poisoned");
        state
            .by_author
            .get(author)
            .map(|idx| idx.iter().map(|&i| state.records[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Look up a record by its receipt hash.
    pub fn record(&self, receipt: &ReceiptHash) -> Option<DatalogRecord> {
        self.inner
            .read()
            .expect("ledger lock poisoned")
            .records
            .iter()
            .find(|r| r.receipt == *receipt)
            .cloned()
    }

    /// Total number of records on the ledger.
    pub fn record_count(&self) -> usize {
        self.inner.read().expect("ledger lock poisoned").records.len()
    }

    fn check_delegation(
        state: &LedgerState,
        author: &Address,
        owner: &Address,
    ) -> LedgerResult<()> {
        if author == owner {
            return Ok(());
        }
        let allowed = state
            .devices
            .get(owner)
            .is_some_and(|devices| devices.contains(author));
        if allowed {
            Ok(())
        } else {
            Err(LedgerError::NotDelegated {
                author: author.clone(),
                owner: owner.clone(),
            })
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for InMemoryLedger {
    fn subscribe(&self, kind: EventKind) -> LedgerResult<EventStream> {
        Ok(self.router.subscribe(kind))
    }

    fn record_datalog(
        &self,
        account: &Account,
        data: &[u8],
        delegation_owner: Option<&Address>,
    ) -> LedgerResult<ReceiptHash> {
        let mut state = self.inner.write().expect("ledger lock poisoned");
        let author = account.address().clone();
        if let Some(owner) = delegation_owner {
            Self::check_delegation(&state, &author, owner)?;
        }

        let seq = state.records.len() as u64 + 1;
        let owner_bytes = delegation_owner.map(|o| o.as_str().as_bytes()).unwrap_or(&[]);
        let receipt = ReceiptHash::from_bytes(ContentHasher::RECEIPT.hash_fields(&[
            author.as_str().as_bytes(),
            &seq.to_le_bytes(),
            owner_bytes,
            data,
        ]));
        let signature = account.sign(&ContentHasher::RECORD.hash(receipt.as_bytes()));

        let index = state.records.len();
        state.records.push(DatalogRecord {
            seq,
            author: author.clone(),
            delegation_owner: delegation_owner.cloned(),
            data: data.to_vec(),
            receipt,
            signature,
        });
        state.by_author.entry(author).or_default().push(index);

        debug!(seq, %receipt, delegated = delegation_owner.is_some(), "datalog recorded");
        Ok(receipt)
    }

    fn delegated_devices(&self, owner: &Account) -> LedgerResult<Vec<Address>> {
        Ok(self
            .inner
            .read()
            .expect("ledger lock poisoned")
            .devices
            .get(owner.address())
            .cloned()
            .unwrap_or_default())
    }
}
