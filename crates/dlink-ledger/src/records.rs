use dlink_crypto::Signature;
use dlink_types::{Address, ReceiptHash};

/// A datalog record as stored by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatalogRecord {
    /// Ledger-wide sequence number (1-based, monotonic).
    pub seq: u64,
    /// Account that signed the record.
    pub author: Address,
    /// Owner of the delegated-access relationship the record was sent under.
    pub delegation_owner: Option<Address>,
    pub data: Vec<u8>,
    pub receipt: ReceiptHash,
    /// Author's signature over the record hash.
    pub signature: Signature,
}

impl DatalogRecord {
    pub fn is_delegated(&self) -> bool {
        self.delegation_owner.is_some()
    }
}
