use tracing::debug;

use dlink_ledger::{BlockingExecutor, WorkerPool};
use dlink_types::ReceiptHash;

use crate::config::LaneConfig;
use crate::state::{LaneCell, LaneState};
use crate::submitter::{RecordSubmitter, SubmissionTarget};

/// Serialized lane for credential records.
///
/// Nothing is coalesced: every request is eventually submitted. A request
/// that found the lane busy polls until it is free, takes it, and then waits
/// the cooldown before submitting, which spaces waiting submissions at least
/// one cooldown apart.
pub struct CredentialLane<E: BlockingExecutor = WorkerPool> {
    cell: LaneCell,
    submitter: RecordSubmitter<E>,
    target: SubmissionTarget,
    config: LaneConfig,
}

impl<E: BlockingExecutor> CredentialLane<E> {
    pub fn new(submitter: RecordSubmitter<E>, target: SubmissionTarget, config: LaneConfig) -> Self {
        Self {
            cell: LaneCell::default(),
            submitter,
            target,
            config,
        }
    }

    /// Submit `data` once the lane is free.
    ///
    /// Returns the receipt, or `None` when the submission failed.
    pub async fn enqueue(&self, data: Vec<u8>) -> Option<ReceiptHash> {
        let _busy = match self.cell.try_acquire() {
            Some(guard) => guard,
            None => {
                debug!("another credential datalog is sending, waiting");
                let guard = loop {
                    tokio::time::sleep(self.config.poll_interval).await;
                    if let Some(guard) = self.cell.try_acquire() {
                        break guard;
                    }
                };
                debug!(cooldown = ?self.config.cooldown, "credential lane free, cooling down");
                tokio::time::sleep(self.config.cooldown).await;
                guard
            }
        };
        self.submitter
            .submit(data, &self.target.identity, self.target.delegate.as_ref())
            .await
    }

    pub fn is_busy(&self) -> bool {
        self.cell.snapshot().busy
    }

    pub fn state(&self) -> LaneState {
        self.cell.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::testing::{address_of, identity, until, wiring, GatedLedger};

    fn lane(ledger: &Arc<GatedLedger>) -> Arc<CredentialLane> {
        let (submitter, target) = wiring(ledger, "owner");
        Arc::new(CredentialLane::new(submitter, target, LaneConfig::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn idle_lane_submits_without_cooldown() {
        let ledger = GatedLedger::new();
        let lane = lane(&ledger);
        let started = Instant::now();
        assert!(lane.enqueue(b"c1".to_vec()).await.is_some());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn every_request_submits_once_spaced_by_cooldown() {
        let ledger = GatedLedger::new();
        let lane = lane(&ledger);
        ledger.close_gate();

        let first = tokio::spawn({
            let lane = Arc::clone(&lane);
            async move {
                let receipt = lane.enqueue(b"c1".to_vec()).await;
                (receipt, Instant::now())
            }
        });
        until(|| lane.is_busy()).await;

        let mut tasks = vec![first];
        for payload in [b"c2", b"c3", b"c4"] {
            let lane = Arc::clone(&lane);
            tasks.push(tokio::spawn(async move {
                let receipt = lane.enqueue(payload.to_vec()).await;
                (receipt, Instant::now())
            }));
        }
        tokio::task::yield_now().await;
        ledger.open_gate();

        let mut finished = Vec::new();
        for task in tasks {
            let (receipt, at) = task.await.unwrap();
            assert!(receipt.is_some());
            finished.push(at);
        }
        finished.sort();
        for pair in finished.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(300));
        }

        let mut recorded = ledger.recorded(&address_of(&identity("owner")));
        recorded.sort();
        assert_eq!(
            recorded,
            vec![b"c1".to_vec(), b"c2".to_vec(), b"c3".to_vec(), b"c4".to_vec()]
        );
        assert!(!ledger.overlapped());
        assert!(!lane.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_returns_none_and_frees_lane() {
        let ledger = GatedLedger::new();
        let lane = lane(&ledger);

        ledger.set_failing(true);
        assert_eq!(lane.enqueue(b"bad".to_vec()).await, None);
        assert!(!lane.is_busy());

        ledger.set_failing(false);
        assert!(lane.enqueue(b"good".to_vec()).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_after_failure_still_submits() {
        let ledger = GatedLedger::new();
        let lane = lane(&ledger);
        ledger.set_failing(true);
        ledger.close_gate();

        let failing = tokio::spawn({
            let lane = Arc::clone(&lane);
            async move { lane.enqueue(b"bad".to_vec()).await }
        });
        until(|| lane.is_busy()).await;
        let waiter = tokio::spawn({
            let lane = Arc::clone(&lane);
            async move { lane.enqueue(b"good".to_vec()).await }
        });
        tokio::task::yield_now().await;

        ledger.open_gate();
        assert_eq!(failing.await.unwrap(), None);
        ledger.set_failing(false);
        assert!(waiter.await.unwrap().is_some());
    }
}
