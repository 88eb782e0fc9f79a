//! Instrumented ledger shared by the lane tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use dlink_ledger::{
    Account, EventStream, InMemoryLedger, LedgerClient, LedgerError, LedgerResult, WorkerPool,
};
use dlink_types::{Address, CurveKind, EventKind, Identity, ReceiptHash};

use crate::submitter::{RecordSubmitter, SubmissionTarget};

/// Wraps [`InMemoryLedger`], detects overlapping record calls, can hold
/// record calls at a gate, and can be told to fail them.
pub(crate) struct GatedLedger {
    pub(crate) inner: InMemoryLedger,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
    fail: AtomicBool,
    gate_open: Mutex<bool>,
    gate: Condvar,
}

impl GatedLedger {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryLedger::new(),
            in_flight: AtomicUsize::new(0),
            overlapped: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            gate_open: Mutex::new(true),
            gate: Condvar::new(),
        })
    }

    /// Hold every record call until [`open_gate`](Self::open_gate).
    pub(crate) fn close_gate(&self) {
        *self.gate_open.lock().unwrap() = false;
    }

    pub(crate) fn open_gate(&self) {
        *self.gate_open.lock().unwrap() = true;
        self.gate.notify_all();
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    /// Payloads recorded so far, in ledger order.
    pub(crate) fn recorded(&self, author: &Address) -> Vec<Vec<u8>> {
        self.inner
            .records_by(author)
            .into_iter()
            .map(|r| r.data)
            .collect()
    }

    fn wait_for_gate(&self) {
        let mut open = self.gate_open.lock().unwrap();
        while !*open {
            open = self.gate.wait(open).unwrap();
        }
    }
}

impl LedgerClient for GatedLedger {
    fn subscribe(&self, kind: EventKind) -> LedgerResult<EventStream> {
        self.inner.subscribe(kind)
    }

    fn record_datalog(
        &self,
        account: &Account,
        data: &[u8],
        delegation_owner: Option<&Address>,
    ) -> LedgerResult<ReceiptHash> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.wait_for_gate();
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(LedgerError::Rejected("simulated failure".into()))
        } else {
            self.inner.record_datalog(account, data, delegation_owner)
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn delegated_devices(&self, owner: &Account) -> LedgerResult<Vec<Address>> {
        self.inner.delegated_devices(owner)
    }
}

pub(crate) fn identity(seed: &str) -> Identity {
    Identity::new(seed, CurveKind::Sr25519).unwrap()
}

pub(crate) fn address_of(identity: &Identity) -> Address {
    Account::from_identity(identity).unwrap().address().clone()
}

/// Submitter over `ledger` plus a direct target signing as `seed`.
pub(crate) fn wiring(ledger: &Arc<GatedLedger>, seed: &str) -> (RecordSubmitter, SubmissionTarget) {
    let submitter = RecordSubmitter::new(ledger.clone(), Arc::new(WorkerPool::new(2)));
    (submitter, SubmissionTarget::direct(identity(seed)))
}

/// Yield to other tasks until `cond` holds.
pub(crate) async fn until(mut cond: impl FnMut() -> bool) {
    while !cond() {
        tokio::task::yield_now().await;
    }
}
