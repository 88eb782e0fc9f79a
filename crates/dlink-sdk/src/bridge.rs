use std::sync::Arc;

use tracing::info;

use dlink_fabric::{EventHandler, EventSubscriber, FixedDelay, SubscriptionHandle};
use dlink_lanes::{CredentialLane, LaneConfig, RecordSubmitter, StateLane, SubmissionTarget};
use dlink_ledger::{BlockingExecutor, LedgerClient, WorkerPool};
use dlink_types::{Address, Identity, ReceiptHash};

use crate::config::BridgeConfig;
use crate::error::SdkResult;

/// Ledger addresses of the two configured identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeAddresses {
    pub owner: Address,
    pub admin: Address,
}

/// Host-facing entry point: event subscription plus the two datalog lanes.
///
/// State datalogs are signed by the admin identity under the owner's
/// delegated access and go through the coalescing [`StateLane`]. Credential
/// datalogs are signed by the owner and go through the serialized
/// [`CredentialLane`].
pub struct Bridge<E: BlockingExecutor = WorkerPool> {
    ledger: Arc<dyn LedgerClient>,
    executor: Arc<E>,
    owner: Identity,
    admin: Identity,
    retry: FixedDelay,
    submitter: RecordSubmitter<E>,
    states: StateLane<E>,
    creds: CredentialLane<E>,
}

impl Bridge<WorkerPool> {
    /// Validate `config` and build a bridge over `ledger`.
    pub fn from_config(config: &BridgeConfig, ledger: Arc<dyn LedgerClient>) -> SdkResult<Self> {
        config.validate()?;
        let (owner, admin) = config.identities()?;
        let executor = Arc::new(WorkerPool::new(config.worker.max_blocking));
        Ok(Self::with_executor(
            ledger,
            executor,
            owner,
            admin,
            config.lanes.to_lane_config(),
            config.subscription.retry_strategy(),
        ))
    }
}

impl<E: BlockingExecutor> Bridge<E> {
    pub fn with_executor(
        ledger: Arc<dyn LedgerClient>,
        executor: Arc<E>,
        owner: Identity,
        admin: Identity,
        lanes: LaneConfig,
        retry: FixedDelay,
    ) -> Self {
        let submitter = RecordSubmitter::new(Arc::clone(&ledger), Arc::clone(&executor));
        let states = StateLane::new(
            submitter.clone(),
            SubmissionTarget::delegated(admin.clone(), owner.clone()),
            lanes,
        );
        let creds = CredentialLane::new(
            submitter.clone(),
            SubmissionTarget::delegated(owner.clone(), owner.clone()),
            lanes,
        );
        Self {
            ledger,
            executor,
            owner,
            admin,
            retry,
            submitter,
            states,
            creds,
        }
    }

    /// Start routing ledger events: launch commands addressed to the admin go
    /// to `handle_launch`, device-list updates from the owner go to
    /// `manage_users`.
    pub fn subscribe(
        &self,
        handle_launch: Arc<dyn EventHandler>,
        manage_users: Arc<dyn EventHandler>,
    ) -> SubscriptionHandle {
        info!("starting ledger event subscription");
        EventSubscriber::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.executor),
            self.owner.clone(),
            self.admin.clone(),
        )
        .with_retry(self.retry)
        .subscribe(handle_launch, manage_users)
    }

    /// Submit a device-state snapshot. `None` if superseded or failed.
    pub async fn send_datalog_states(&self, data: Vec<u8>) -> Option<ReceiptHash> {
        info!(bytes = data.len(), "sending state datalog");
        self.states.enqueue(data).await
    }

    /// Submit a credential record. `None` if the submission failed.
    pub async fn send_datalog_creds(&self, data: Vec<u8>) -> Option<ReceiptHash> {
        info!(bytes = data.len(), "sending credential datalog");
        self.creds.enqueue(data).await
    }

    /// Devices holding delegated access under the owner.
    pub async fn get_devices_list(&self) -> Option<Vec<Address>> {
        self.submitter.list_delegated_devices(&self.owner).await
    }

    /// Derive both ledger addresses.
    pub async fn addresses(&self) -> SdkResult<BridgeAddresses> {
        let ledger = Arc::clone(&self.ledger);
        let owner = self.owner.clone();
        let admin = self.admin.clone();
        let addresses = self
            .executor
            .run(move || -> SdkResult<BridgeAddresses> {
                Ok(BridgeAddresses {
                    owner: ledger.account(&owner)?.address().clone(),
                    admin: ledger.account(&admin)?.address().clone(),
                })
            })
            .await??;
        Ok(addresses)
    }

    pub fn state_lane(&self) -> &StateLane<E> {
        &self.states
    }

    pub fn credential_lane(&self) -> &CredentialLane<E> {
        &self.creds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use dlink_fabric::handler_fn;
    use dlink_ledger::{Account, InMemoryLedger};
    use dlink_types::{CurveKind, LedgerEvent};

    use crate::error::SdkError;

    const CONFIG: &str = r#"
        [owner]
        seed = "owner phrase"

        [admin]
        seed = "admin phrase"
        ed25519 = true

        [worker]
        max_blocking = 2
    "#;

    fn bridge(ledger: &Arc<InMemoryLedger>) -> Bridge {
        let config = BridgeConfig::from_toml_str(CONFIG).unwrap();
        Bridge::from_config(&config, ledger.clone()).unwrap()
    }

    fn address_of(seed: &str, curve: CurveKind) -> Address {
        let identity = Identity::new(seed, curve).unwrap();
        Account::from_identity(&identity).unwrap().address().clone()
    }

    fn owner_address() -> Address {
        address_of("owner phrase", CurveKind::Sr25519)
    }

    fn admin_address() -> Address {
        address_of("admin phrase", CurveKind::Ed25519)
    }

    fn channel_handler() -> (Arc<dyn EventHandler>, mpsc::UnboundedReceiver<LedgerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = handler_fn(move |event| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(event);
            }
        });
        (handler, rx)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = BridgeConfig::from_toml_str("[owner]\nseed = \"x\"\n").unwrap();
        let ledger: Arc<dyn LedgerClient> = Arc::new(InMemoryLedger::new());
        assert!(matches!(
            Bridge::from_config(&config, ledger),
            Err(SdkError::Config(_))
        ));
    }

    #[tokio::test]
    async fn addresses_match_identities() {
        let ledger = Arc::new(InMemoryLedger::new());
        let addresses = bridge(&ledger).addresses().await.unwrap();
        assert_eq!(addresses.owner, owner_address());
        assert_eq!(addresses.admin, admin_address());
    }

    #[tokio::test]
    async fn state_datalog_is_signed_by_admin_for_owner() {
        let ledger = Arc::new(InMemoryLedger::new());
        let bridge = bridge(&ledger);

        // Admin holds no delegated access yet.
        assert_eq!(bridge.send_datalog_states(b"{}".to_vec()).await, None);

        ledger.grant_devices(&owner_address(), vec![admin_address()]);
        let receipt = bridge.send_datalog_states(b"{}".to_vec()).await.unwrap();
        let record = ledger.record(&receipt).unwrap();
        assert_eq!(record.author, admin_address());
        assert_eq!(record.delegation_owner, Some(owner_address()));
        assert!(!bridge.state_lane().is_busy());
    }

    #[tokio::test]
    async fn credential_datalog_is_signed_by_owner() {
        let ledger = Arc::new(InMemoryLedger::new());
        let bridge = bridge(&ledger);

        let receipt = bridge.send_datalog_creds(b"creds".to_vec()).await.unwrap();
        let record = ledger.record(&receipt).unwrap();
        assert_eq!(record.author, owner_address());
        assert_eq!(record.delegation_owner, Some(owner_address()));
        assert_eq!(record.data, b"creds");
    }

    #[tokio::test]
    async fn lists_owner_devices() {
        let ledger = Arc::new(InMemoryLedger::new());
        let bridge = bridge(&ledger);
        assert_eq!(bridge.get_devices_list().await, Some(vec![]));

        let devices = vec![admin_address(), Address::from("device-2")];
        ledger.grant_devices(&owner_address(), devices.clone());
        assert_eq!(bridge.get_devices_list().await, Some(devices));
    }

    #[tokio::test]
    async fn subscription_routes_to_host_handlers() {
        let ledger = Arc::new(InMemoryLedger::new());
        let bridge = bridge(&ledger);
        let (launch, mut launches) = channel_handler();
        let (users, mut user_updates) = channel_handler();
        let handle = bridge.subscribe(launch, users);

        while ledger.subscriber_count() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        ledger.launch(&Address::from("sender"), &admin_address());
        let event = launches.recv().await.unwrap();
        assert_eq!(event.source, Address::from("sender"));

        ledger.grant_devices(&owner_address(), vec![Address::from("device-1")]);
        let event = user_updates.recv().await.unwrap();
        assert_eq!(event.payload.as_list().unwrap(), ["device-1"]);

        handle.abort();
    }
}
