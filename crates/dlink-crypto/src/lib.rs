//! Cryptographic primitives for dlink.
//!
//! Provides deterministic keypair derivation from an [`Identity`], Ed25519
//! signing/verification, and domain-separated BLAKE3 hashing for receipts.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.
//!
//! [`Identity`]: dlink_types::Identity

pub mod hasher;
pub mod signer;

pub use hasher::ContentHasher;
pub use signer::{KeyError, Keypair, Signature, VerifyingKey};
