use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use dlink_ledger::{BlockingExecutor, LedgerClient, WorkerPool};
use dlink_types::{EventKind, Identity};

use crate::dispatch::{EventHandler, Handlers, RouteTable};
use crate::error::Result;
use crate::event::{MultiEvent, MultiEventStream};
use crate::retry::{FixedDelay, RetryStrategy};

/// An open merged subscription plus the addresses it routes against.
struct OpenSubscription {
    routes: RouteTable,
    stream: MultiEventStream,
}

/// Keeps a merged `NewLaunch` + `NewDevices` subscription open and routes
/// every event to one of two host handlers.
pub struct EventSubscriber<E: BlockingExecutor = WorkerPool> {
    ledger: Arc<dyn LedgerClient>,
    executor: Arc<E>,
    owner: Identity,
    admin: Identity,
    retry: Box<dyn RetryStrategy>,
}

impl<E: BlockingExecutor> EventSubscriber<E> {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        executor: Arc<E>,
        owner: Identity,
        admin: Identity,
    ) -> Self {
        Self {
            ledger,
            executor,
            owner,
            admin,
            retry: Box::new(FixedDelay::default()),
        }
    }

    /// Replace the delay policy between subscription attempts.
    pub fn with_retry(mut self, strategy: impl RetryStrategy + 'static) -> Self {
        self.retry = Box::new(strategy);
        self
    }

    /// Register both handlers and start the subscription loop as a task.
    pub fn subscribe(
        self,
        handle_launch: Arc<dyn EventHandler>,
        manage_users: Arc<dyn EventHandler>,
    ) -> SubscriptionHandle {
        let handlers = Handlers::new(handle_launch, manage_users);
        SubscriptionHandle {
            task: tokio::spawn(self.run(handlers)),
        }
    }

    /// Subscription loop. Never returns: open failures and closed streams
    /// are logged and the subscription is re-opened after the retry delay.
    pub async fn run(mut self, handlers: Handlers) {
        let mut attempt: u32 = 0;
        loop {
            match self.open().await {
                Ok(mut sub) => {
                    attempt = 0;
                    info!(
                        admin = %sub.routes.admin.short(),
                        owner = %sub.routes.owner.short(),
                        "ledger subscription open"
                    );
                    while let Some(event) = sub.stream.next().await {
                        deliver(&sub.routes, &handlers, event);
                    }
                    warn!("ledger subscription closed");
                }
                Err(e) => {
                    warn!(error = %e, attempt, "ledger subscription failed");
                }
            }
            attempt = attempt.saturating_add(1);
            let delay = self.retry.next_delay(attempt);
            debug!(?delay, attempt, "re-opening ledger subscription");
            tokio::time::sleep(delay).await;
        }
    }

    /// Derive the routing addresses and register both event kinds.
    async fn open(&self) -> Result<OpenSubscription> {
        let ledger = Arc::clone(&self.ledger);
        let owner = self.owner.clone();
        let admin = self.admin.clone();
        self.executor
            .run(move || -> Result<OpenSubscription> {
                let routes = RouteTable::new(
                    ledger.account(&admin)?.address().clone(),
                    ledger.account(&owner)?.address().clone(),
                );
                let launches = ledger.subscribe(EventKind::NewLaunch)?;
                let devices = ledger.subscribe(EventKind::NewDevices)?;
                Ok(OpenSubscription {
                    routes,
                    stream: MultiEventStream::new(launches, devices),
                })
            })
            .await?
    }
}

fn deliver(routes: &RouteTable, handlers: &Handlers, event: MultiEvent) {
    let kind = event.kind();
    let event = event.into_event();
    match routes.classify(&event) {
        Some(route) => {
            debug!(%kind, ?route, source = %event.source.short(), "dispatching ledger event");
            handlers.spawn(route, event);
        }
        None => {
            trace!(%kind, source = %event.source.short(), "ignoring ledger event");
        }
    }
}

/// Handle to a running subscription loop.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop the subscription loop. Handler tasks already spawned keep running.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
