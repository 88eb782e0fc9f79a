/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a receipt and a seed with identical bytes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for datalog receipts.
    pub const RECEIPT: Self = Self {
        domain: "dlink-receipt-v1",
    };
    /// Hasher for datalog record signatures.
    pub const RECORD: Self = Self {
        domain: "dlink-record-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash a sequence of fields with domain separation.
    ///
    /// Every field is length-prefixed so `["ab", "c"]` and `["a", "bc"]`
    /// hash differently.
    pub fn hash_fields(&self, fields: &[&[u8]]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for field in fields {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        self.hash_fields(&[data])
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
