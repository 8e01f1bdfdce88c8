//! Error types for the stake registry.

use shared_types::NodePublicKey;
use thiserror::Error;

/// Stake registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Registration for a public key that is already active.
    #[error("Node already registered: {key:?}")]
    DuplicateKey { key: NodePublicKey },

    /// Contribution portions that do not partition the full stake unit.
    #[error("Invalid contribution set: {reason}")]
    InvalidContribution { reason: String },

    /// Operation against a key with no active registration.
    #[error("Unknown node: {key:?}")]
    UnknownNode { key: NodePublicKey },

    /// Top-up from an address not in the reserved contributor list.
    #[error("Unknown contributor for node {key:?}")]
    UnknownContributor { key: NodePublicKey },

    /// Top-up against a node that is already fully staked.
    #[error("Node {key:?} is not accepting contributions")]
    NotAcceptingContributions { key: NodePublicKey },

    /// A bug, not an input error: canonical ordering or marker monotonicity
    /// violated. Fatal in debug builds, logged-and-rejected in release.
    #[error("Internal inconsistency: {reason}")]
    InternalInconsistency { reason: String },
}

/// Result type for registry operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
