use std::sync::Arc;

use tracing::{debug, error};

use dlink_ledger::{BlockingExecutor, LedgerClient, WorkerPool};
use dlink_types::{Address, Identity, ReceiptHash};

use crate::error::SubmitError;

/// Who signs a lane's records, and under whose delegated access.
#[derive(Clone, Debug)]
pub struct SubmissionTarget {
    pub identity: Identity,
    /// Owner of the delegated-access relationship, if records go through one.
    pub delegate: Option<Identity>,
}

impl SubmissionTarget {
    /// Records signed by `identity` as bare datalogs.
    pub fn direct(identity: Identity) -> Self {
        Self {
            identity,
            delegate: None,
        }
    }

    /// Records signed by `identity` under `owner`'s delegated access.
    pub fn delegated(identity: Identity, owner: Identity) -> Self {
        Self {
            identity,
            delegate: Some(owner),
        }
    }
}

/// Stateless datalog submission through a blocking executor.
pub struct RecordSubmitter<E: BlockingExecutor = WorkerPool> {
    ledger: Arc<dyn LedgerClient>,
    executor: Arc<E>,
}

impl<E: BlockingExecutor> Clone for RecordSubmitter<E> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E: BlockingExecutor> RecordSubmitter<E> {
    pub fn new(ledger: Arc<dyn LedgerClient>, executor: Arc<E>) -> Self {
        Self { ledger, executor }
    }

    /// Record `data` signed by `identity`, optionally under the delegated
    /// access owned by `as_delegate_of`.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn submit(
        &self,
        data: Vec<u8>,
        identity: &Identity,
        as_delegate_of: Option<&Identity>,
    ) -> Option<ReceiptHash> {
        match self.try_submit(data, identity, as_delegate_of).await {
            Ok(receipt) => {
                debug!(%receipt, "datalog created");
                Some(receipt)
            }
            Err(e) => {
                error!(error = %e, "send datalog failed");
                None
            }
        }
    }

    /// Like [`submit`](Self::submit), but returns the failure.
    pub async fn try_submit(
        &self,
        data: Vec<u8>,
        identity: &Identity,
        as_delegate_of: Option<&Identity>,
    ) -> Result<ReceiptHash, SubmitError> {
        let ledger = Arc::clone(&self.ledger);
        let identity = identity.clone();
        let owner = as_delegate_of.cloned();
        self.executor
            .run(move || {
                let account = ledger.account(&identity).map_err(SubmitError::Account)?;
                let owner = owner
                    .map(|o| ledger.account(&o).map(|a| a.address().clone()))
                    .transpose()
                    .map_err(SubmitError::Delegation)?;
                debug!(delegated = owner.is_some(), bytes = data.len(), "recording datalog");
                ledger
                    .record_datalog(&account, &data, owner.as_ref())
                    .map_err(SubmitError::Record)
            })
            .await?
    }

    /// Addresses holding delegated access under `identity`.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn list_delegated_devices(&self, identity: &Identity) -> Option<Vec<Address>> {
        let ledger = Arc::clone(&self.ledger);
        let identity = identity.clone();
        let result = self
            .executor
            .run(move || {
                let account = ledger.account(&identity).map_err(SubmitError::Account)?;
                ledger
                    .delegated_devices(&account)
                    .map_err(SubmitError::Query)
            })
            .await
            .map_err(SubmitError::from)
            .and_then(|inner| inner);
        match result {
            Ok(devices) => Some(devices),
            Err(e) => {
                error!(error = %e, "error while getting delegated devices list");
                None
            }
        }
    }
}
