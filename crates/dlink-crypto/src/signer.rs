use serde::{Deserialize, Serialize};

use dlink_types::{Address, CurveKind, Identity};

/// Key derivation context for passphrase / mnemonic seeds.
const PHRASE_CONTEXT: &str = "dlink 2024-05 seed phrase to secret v1";
/// Key derivation context for the default account scheme.
const SR25519_CONTEXT: &str = "dlink 2024-05 sr25519 account secret v1";

/// Account keypair derived from an [`Identity`].
///
/// Signing always uses Ed25519. Accounts on the default scheme get their
/// secret through an extra curve-specific derivation step, so the same seed
/// produces distinct addresses on the two curve kinds.
pub struct Keypair {
    curve: CurveKind,
    key: ed25519_dalek::SigningKey,
}

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_serde")] ed25519_dalek::Signature);

impl Keypair {
    /// Derive the keypair for an identity.
    ///
    /// A seed of the form `0x` + 64 hex characters is taken as the raw
    /// secret; anything else is treated as a passphrase.
    pub fn from_identity(identity: &Identity) -> Result<Self, KeyError> {
        let secret = seed_secret(identity.seed())?;
        let secret = match identity.curve() {
            CurveKind::Ed25519 => secret,
            CurveKind::Sr25519 => blake3::derive_key(SR25519_CONTEXT, &secret),
        };
        Ok(Self {
            curve: identity.curve(),
            key: ed25519_dalek::SigningKey::from_bytes(&secret),
        })
    }

    pub fn curve(&self) -> CurveKind {
        self.curve
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.key.verifying_key())
    }

    /// Ledger address of this keypair.
    pub fn address(&self) -> Address {
        self.verifying_key().to_address()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.key.sign(message))
    }
}

impl VerifyingKey {
    /// Verify a signature on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), KeyError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| KeyError::InvalidSignature)
    }

    /// `0x`-prefixed hex of the public key.
    pub fn to_address(&self) -> Address {
        Address::new(format!("0x{}", hex::encode(self.0.to_bytes())))
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| KeyError::InvalidKey)?;
        Ok(Self(key))
    }
}

fn seed_secret(seed: &str) -> Result<[u8; 32], KeyError> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(KeyError::InvalidSeed("empty seed".into()));
    }
    match seed.strip_prefix("0x") {
        Some(raw) => {
            let bytes = hex::decode(raw).map_err(|e| KeyError::InvalidSeed(e.to_string()))?;
            bytes.try_into().map_err(|b: Vec<u8>| {
                KeyError::InvalidSeed(format!("expected 32 seed bytes, got {}", b.len()))
            })
        }
        None => Ok(blake3::derive_key(PHRASE_CONTEXT, seed.as_bytes())),
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({}, <redacted>)", self.curve)
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.to_bytes()))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

/// Errors from key derivation and signing.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key")]
    InvalidKey,
}

mod signature_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sig: &ed25519_dalek::Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&sig.to_bytes())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ed25519_dalek::Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))?;
        Ok(ed25519_dalek::Signature::from_bytes(&arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(seed: &str, curve: CurveKind) -> Identity {
        Identity::new(seed, curve).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let id = identity("alpha bravo charlie", CurveKind::Sr25519);
        let a = Keypair::from_identity(&id).unwrap();
        let b = Keypair::from_identity(&id).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn curve_kind_changes_address() {
        let sr = Keypair::from_identity(&identity("same seed", CurveKind::Sr25519)).unwrap();
        let ed = Keypair::from_identity(&identity("same seed", CurveKind::Ed25519)).unwrap();
        assert_ne!(sr.address(), ed.address());
    }

    #[test]
    fn raw_hex_seed_accepted() {
        let seed = format!("0x{}", "11".repeat(32));
        let kp = Keypair::from_identity(&identity(&seed, CurveKind::Ed25519)).unwrap();
        let expected = ed25519_dalek::SigningKey::from_bytes(&[0x11; 32]).verifying_key();
        assert_eq!(kp.verifying_key().as_bytes(), expected.to_bytes());
    }

    #[test]
    fn malformed_hex_seed_rejected() {
        let err = Keypair::from_identity(&identity("0xzz", CurveKind::Ed25519)).unwrap_err();
        assert!(matches!(err, KeyError::InvalidSeed(_)));

        let short = Keypair::from_identity(&identity("0xabcd", CurveKind::Sr25519)).unwrap_err();
        assert!(matches!(short, KeyError::InvalidSeed(_)));
    }

    #[test]
    fn sign_and_verify() {
        let kp = Keypair::from_identity(&identity("signer", CurveKind::Sr25519)).unwrap();
        let sig = kp.sign(b"record");
        assert!(kp.verifying_key().verify(b"record", &sig).is_ok());
        assert_eq!(
            kp.verifying_key().verify(b"other", &sig),
            Err(KeyError::InvalidSignature)
        );
    }

    #[test]
    fn address_format() {
        let kp = Keypair::from_identity(&identity("addr", CurveKind::Ed25519)).unwrap();
        let addr = kp.address();
        assert!(addr.as_str().starts_with("0x"));
        assert_eq!(addr.as_str().len(), 66);
    }

    #[test]
    fn verifying_key_bytes_roundtrip() {
        let kp = Keypair::from_identity(&identity("vk", CurveKind::Ed25519)).unwrap();
        let vk = VerifyingKey::from_bytes(kp.verifying_key().as_bytes()).unwrap();
        assert_eq!(vk, kp.verifying_key());
    }

    #[test]
    fn signature_serde_roundtrip() {
        let kp = Keypair::from_identity(&identity("serde", CurveKind::Sr25519)).unwrap();
        let sig = kp.sign(b"test");
        let json = serde_json::to_string(&sig).unwrap();
        let parsed: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn debug_redacts_keypair() {
        let kp = Keypair::from_identity(&identity("hidden", CurveKind::Ed25519)).unwrap();
        assert!(format!("{kp:?}").contains("redacted"));
    }
}
