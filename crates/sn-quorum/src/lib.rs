//! # sn-quorum
//!
//! Deterministic quorum formation and threshold-signed deregistration.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **QuorumGenerator**: seeded Fisher-Yates derivation of the disjoint
//!   voter/tested sets from a block hash, bit-identical across nodes
//! - **VoteCollector**: per-target vote pools with duplicate-voter
//!   protection and a terminal, idempotent threshold transition
//! - **BlockProcessor**: the atomic per-block step that orders winner
//!   selection, registration intake, deregistration, and expiry under one
//!   exclusive ledger acquisition
//!
//! ## Data Flow
//!
//! ```text
//! BlockRecord ──hash──→ QuorumGenerator ──voters/to_test──→ VoteCollector
//!                                                               │
//!                                       threshold ──→ StakeLedger.remove
//! ```

pub mod config;
pub mod dereg;
pub mod error;
pub mod quorum;
pub mod service;

pub use config::{QuorumConfig, DEFAULT_MIN_VOTES_TO_KICK, DEFAULT_QUORUM_SIZE};
pub use dereg::{validate_deregister_payload, DeregisterVote, VoteCollector, VoteOutcome};
pub use error::{ProcessError, ProcessResult, VoteError, VoteResult};
pub use quorum::{seed_from_hash, shuffled_indices, QuorumEntry, QuorumGenerator, QuorumState};
pub use service::{BlockOutcome, BlockProcessor};
