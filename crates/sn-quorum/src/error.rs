//! Error types for quorum voting and block processing.

use shared_types::{KeyImage, NodePublicKey};
use thiserror::Error;

/// Deregistration vote validation errors.
///
/// All of these reject the offending vote or payload; none is fatal to the
/// collector, which keeps accepting further votes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteError {
    /// No quorum exists for the referenced height.
    #[error("No quorum available for height {height}")]
    NoQuorum { height: u64 },

    /// Voter index outside the committee.
    #[error("Voter index {index} outside committee of {committee}")]
    InvalidVoterIndex { index: u32, committee: usize },

    /// Target index outside the tested set.
    #[error("Target index {index} outside tested set of {pool}")]
    InvalidTargetIndex { index: u32, pool: usize },

    /// Signature does not verify against the committee member.
    #[error("Invalid signature from voter {voter_index}")]
    InvalidSignature { voter_index: u32 },

    /// A second vote from the same committee position.
    #[error("Duplicate vote from voter {voter_index}")]
    DuplicateVoter { voter_index: u32 },

    /// Deregistration referencing a node that is no longer active.
    #[error("Stale deregistration target at height {height}, index {index}")]
    StaleTarget { height: u64, index: u32 },

    /// Payload short of the vote threshold.
    #[error("Insufficient votes: have {have}, need {need}")]
    NotEnoughVotes { have: usize, need: usize },
}

/// Result type for vote operations.
pub type VoteResult<T> = Result<T, VoteError>;

/// Block-processing errors: any of these rejects the whole block; the
/// ledger is never left partially applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    Vote(#[from] VoteError),

    #[error(transparent)]
    Ledger(#[from] sn_registry::LedgerError),

    #[error(transparent)]
    Decode(#[from] sn_wire::DecodeError),

    /// Deregister-typed transaction without a deregistration payload.
    #[error("Deregister transaction carries no deregistration payload")]
    MissingDeregisterPayload,

    /// Registration payload whose operator signature does not verify.
    #[error("Invalid registration signature for node {node:?}")]
    InvalidRegistration { node: NodePublicKey },

    /// Registration payload past its expiration timestamp.
    #[error("Registration for node {node:?} expired at {expiration}")]
    ExpiredRegistration { node: NodePublicKey, expiration: u64 },

    /// Pruned records are unusable for consensus re-checks.
    #[error("Pruned transaction in consensus path")]
    PrunedTransaction,

    /// A key image seen before: a double-spend attempt.
    #[error("Duplicate key image {key_image:?}")]
    DuplicateKeyImage { key_image: KeyImage },
}

/// Result type for block processing.
pub type ProcessResult<T> = Result<T, ProcessError>;
