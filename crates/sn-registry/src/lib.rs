//! # sn-registry
//!
//! Stake-contribution ledger and reward-winner selection.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **StakeLedger**: per-node contributor stakes, expiry heights, and
//!   reward markers, stored in canonical public-key order
//! - **Winner selection**: least-recently-rewarded ordering with
//!   never-rewarded nodes first
//! - **Fork-aware expiry**: the one-block expiry offset across the hard
//!   fork is a configuration parameter, not a guessed constant
//!
//! The ledger is the one genuinely contended resource in the core; callers
//! acquire it exclusively for the whole of a block-processing step so that
//! partial application is never observable.

pub mod config;
pub mod error;
pub mod ledger;
pub mod winner;

pub use config::{
    ExpiryRule, RegistryConfig, DEFAULT_STAKE_LOCK_BLOCKS, DEFAULT_STAKING_REQUIREMENT,
    FULL_STAKE_PORTIONS,
};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Contributor, NodeRegistration, RewardMarker, StakeLedger};
pub use winner::pick_winner;
