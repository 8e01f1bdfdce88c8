//! # Core Domain Entities
//!
//! Defines the primitive types that every consensus-core subsystem agrees on.
//!
//! ## Clusters
//!
//! - **Content addressing**: `Hash`
//! - **Identity**: `NodePublicKey`, `Address`
//! - **Authentication**: `Signature`, `KeyImage`

use serde::{Deserialize, Serialize};

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
///
/// Structs embedding this use `serde_with::Bytes` for their serde derives.
pub type Signature = [u8; 64];

/// The public key a registered node is identified by.
///
/// Ordering is the canonical ledger ordering: every list of active nodes is
/// sorted by this key so that independently-replayed ledgers are
/// byte-identical.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NodePublicKey(pub [u8; 32]);

impl NodePublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for NodePublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A reward-destination account address.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// One-time spend tag derived from an output key.
///
/// Globally unique across all committed transactions; a repeated key image is
/// a double-spend.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct KeyImage(pub [u8; 32]);

impl KeyImage {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for KeyImage {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
