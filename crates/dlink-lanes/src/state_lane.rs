use tracing::debug;

use dlink_ledger::{BlockingExecutor, WorkerPool};
use dlink_types::ReceiptHash;

use crate::config::LaneConfig;
use crate::state::{LaneCell, LaneState, WaitPoll};
use crate::submitter::{RecordSubmitter, SubmissionTarget};

/// Coalescing lane for device-state snapshots.
///
/// An idle lane submits at once. While it is busy, each new request takes a
/// ticket and polls; a request whose ticket has been overtaken by a newer one
/// drops out with `None`. The surviving request resets the ticket counter,
/// waits the settle delay, and submits.
pub struct StateLane<E: BlockingExecutor = WorkerPool> {
    cell: LaneCell,
    submitter: RecordSubmitter<E>,
    target: SubmissionTarget,
    config: LaneConfig,
}

impl<E: BlockingExecutor> StateLane<E> {
    pub fn new(submitter: RecordSubmitter<E>, target: SubmissionTarget, config: LaneConfig) -> Self {
        Self {
            cell: LaneCell::default(),
            submitter,
            target,
            config,
        }
    }

    /// Submit `data`, or give up in favour of a newer request.
    ///
    /// Returns the receipt, or `None` when superseded or when the submission
    /// failed.
    pub async fn enqueue(&self, data: Vec<u8>) -> Option<ReceiptHash> {
        let _busy = match self.cell.try_acquire_fresh() {
            Some(guard) => guard,
            None => {
                let ticket = self.cell.take_ticket();
                debug!(ticket, "another datalog is sending, waiting");
                let guard = loop {
                    tokio::time::sleep(self.config.poll_interval).await;
                    match self.cell.poll_waiter(ticket) {
                        WaitPoll::Superseded => {
                            debug!(ticket, "newer state datalog queued, dropping this one");
                            return None;
                        }
                        WaitPoll::Acquired(guard) => break guard,
                        WaitPoll::Busy => {}
                    }
                };
                tokio::time::sleep(self.config.settle_delay).await;
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
