use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Signature scheme used by an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// The ledger's default account scheme.
    #[default]
    Sr25519,
    /// Alternate Edwards-curve scheme.
    Ed25519,
}

impl CurveKind {
    /// Pick the curve from the `ed25519` configuration flag.
    pub fn from_ed_flag(ed25519: bool) -> Self {
        if ed25519 {
            Self::Ed25519
        } else {
            Self::Sr25519
        }
    }

    /// Stable lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sr25519 => "sr25519",
            Self::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signing credential: seed material plus the curve it is used with.
///
/// Identities are built once at startup and live for the whole process. The
/// seed never leaves this type: there is no `Serialize` impl and the `Debug`
/// output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    seed: String,
    curve: CurveKind,
}

impl Identity {
    /// Build an identity from a mnemonic, passphrase, or `0x`-prefixed raw seed.
    pub fn new(seed: impl Into<String>, curve: CurveKind) -> Result<Self, TypeError> {
        let seed = seed.into();
        if seed.trim().is_empty() {
            return Err(TypeError::EmptySeed);
        }
        Ok(Self { seed, curve })
    }

    /// Seed material. Only key derivation should read this.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn curve(&self) -> CurveKind {
        self.curve
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}, <redacted>)", self.curve)
    }
}

/// Ledger account address.
///
/// Addresses are opaque strings produced by the ledger SDK; the bridge only
/// ever compares them for equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines (first 10 characters).
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(10) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_from_flag() {
        assert_eq!(CurveKind::from_ed_flag(true), CurveKind::Ed25519);
        assert_eq!(CurveKind::from_ed_flag(false), CurveKind::Sr25519);
        assert_eq!(CurveKind::default(), CurveKind::Sr25519);
    }

    #[test]
    fn empty_seed_rejected() {
        assert_eq!(
            Identity::new("   ", CurveKind::Sr25519).unwrap_err(),
            TypeError::EmptySeed
        );
    }

    #[test]
    fn debug_redacts_seed() {
        let id = Identity::new("very secret words", CurveKind::Ed25519).unwrap();
        let debug = format!("{id:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn address_short_form() {
        let addr = Address::new("4GxyzABCDEFGHIJKLMNOP");
        assert_eq!(addr.short(), "4GxyzABCDE");
        assert_eq!(Address::new("abc").short(), "abc");
    }

    #[test]
    fn address_serde_is_transparent() {
        let addr = Address::from("4Gabc");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"4Gabc\"");
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }
}
