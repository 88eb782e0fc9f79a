use dlink_crypto::{Keypair, Signature};
use dlink_types::{Address, EventKind, Identity, ReceiptHash};

use crate::error::LedgerResult;
use crate::router::EventStream;

/// A constructed ledger account: the keypair of an identity plus its address.
#[derive(Debug)]
pub struct Account {
    address: Address,
    keypair: Keypair,
}

impl Account {
    /// Derive the account for an identity.
    pub fn from_identity(identity: &Identity) -> LedgerResult<Self> {
        let keypair = Keypair::from_identity(identity)?;
        Ok(Self {
            address: keypair.address(),
            keypair,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message)
    }
}

/// Blocking boundary to the ledger SDK.
///
/// Every method may perform network I/O and block the calling thread, so
/// async callers must go through a blocking executor.
pub trait LedgerClient: Send + Sync {
    /// Construct the account handle for an identity.
    fn account(&self, identity: &Identity) -> LedgerResult<Account> {
        Account::from_identity(identity)
    }

    /// Register a subscription for one event kind.
    fn subscribe(&self, kind: EventKind) -> LedgerResult<EventStream>;

    /// Append a datalog record signed by `account`.
    ///
    /// With `delegation_owner` set, the record is sent under the
    /// delegated-access relationship owned by that address.
    fn record_datalog(
        &self,
        account: &Account,
        data: &[u8],
        delegation_owner: Option<&Address>,
    ) -> LedgerResult<ReceiptHash>;

    /// Addresses currently holding delegated access under `owner`.
    fn delegated_devices(&self, owner: &Account) -> LedgerResult<Vec<Address>>;
}
