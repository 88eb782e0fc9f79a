use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use dlink_types::{Address, EventPayload, LedgerEvent};

/// Host-side consumer of routed ledger events.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: LedgerEvent);
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(LedgerEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: LedgerEvent) {
        (self.0)(event).await
    }
}

/// Wrap an async closure as an [`EventHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(LedgerEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Which host handler an event is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// A launch command addressed to the admin account.
    Launch,
    /// A device-list update on the owner's delegated-access relationship.
    ManageUsers,
}

/// Addresses the classification compares against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    pub admin: Address,
    pub owner: Address,
}

impl RouteTable {
    pub fn new(admin: Address, owner: Address) -> Self {
        Self { admin, owner }
    }

    /// Classify an event purely by payload shape and address match.
    ///
    /// A text payload routes to [`Route::Launch`] only when it names the
    /// admin address; a list payload routes to [`Route::ManageUsers`] only
    /// when the owner sent it. Everything else is filtered out.
    pub fn classify(&self, event: &LedgerEvent) -> Option<Route> {
        match &event.payload {
            EventPayload::Text(target) if target == self.admin.as_str() => Some(Route::Launch),
            EventPayload::List(_) if event.source == self.owner => Some(Route::ManageUsers),
            _ => None,
        }
    }
}

/// The two registered host handlers.
#[derive(Clone)]
pub struct Handlers {
    handle_launch: Arc<dyn EventHandler>,
    manage_users: Arc<dyn EventHandler>,
}

impl Handlers {
    pub fn new(handle_launch: Arc<dyn EventHandler>, manage_users: Arc<dyn EventHandler>) -> Self {
        Self {
            handle_launch,
            manage_users,
        }
    }

    /// Run the handler for `route` as an independent task.
    pub fn spawn(&self, route: Route, event: LedgerEvent) -> JoinHandle<()> {
        let handler = match route {
            Route::Launch => Arc::clone(&self.handle_launch),
            Route::ManageUsers => Arc::clone(&self.manage_users),
        };
        tokio::spawn(async move { handler.handle(event).await })
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handlers { .. }")
    }
}
