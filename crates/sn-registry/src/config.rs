//! Configuration for the stake registry.

use serde::Deserialize;

/// Denominator for contribution portions: a registration's portions must sum
/// to exactly this value.
pub const FULL_STAKE_PORTIONS: u64 = 0xffff_ffff_ffff_fffc;

/// Default stake requirement in atomic units.
pub const DEFAULT_STAKING_REQUIREMENT: u64 = 45_000_000_000;

/// Default number of blocks a registration stays locked before natural
/// expiry (30 days at a two-minute block target).
pub const DEFAULT_STAKE_LOCK_BLOCKS: u64 = 21_600;

/// Which height the expiry sweep measures against.
///
/// The reference behavior differs by one block across a hard-fork boundary,
/// so the offset is a policy parameter rather than a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
pub enum ExpiryRule {
    /// Pre-fork: nodes with `expiry_height < height` are swept.
    #[default]
    CurrentHeight,
    /// Post-fork: nodes with `expiry_height < height - 1` are swept.
    PreviousHeight,
}

impl ExpiryRule {
    /// The exclusive cutoff for a sweep at `height`.
    pub fn cutoff(&self, height: u64) -> u64 {
        match self {
            Self::CurrentHeight => height,
            Self::PreviousHeight => height.saturating_sub(1),
        }
    }
}

/// Runtime configuration for the stake registry.
#[derive(Clone, Debug, Deserialize)]
pub struct RegistryConfig {
    /// Total locked amount required for a node to be fully staked.
    pub staking_requirement: u64,

    /// Blocks between a node's registration height and its natural expiry.
    pub stake_lock_blocks: u64,

    /// Fork-dependent expiry offset.
    pub expiry_rule: ExpiryRule,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            staking_requirement: DEFAULT_STAKING_REQUIREMENT,
            stake_lock_blocks: DEFAULT_STAKE_LOCK_BLOCKS,
            expiry_rule: ExpiryRule::default(),
        }
    }
}
