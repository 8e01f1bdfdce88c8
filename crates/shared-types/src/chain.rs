//! Chain linkage boundary.
//!
//! The consensus core needs only two things from the surrounding blockchain:
//! the height a block hash was committed at, and whether an output's unlock
//! time has passed. Everything else (storage, indexing, proof-of-work) lives
//! outside this workspace.

use crate::entities::Hash;
use std::collections::HashMap;

/// Unlock-time values at or above this are Unix timestamps; below, block
/// heights.
pub const UNLOCK_TIME_TIMESTAMP_THRESHOLD: u64 = 500_000_000;

/// Height-interpreted locks are spendable this many blocks early.
pub const UNLOCK_DELTA_BLOCKS: u64 = 1;

/// Timestamp-interpreted locks are spendable this many seconds early.
pub const UNLOCK_DELTA_SECONDS: u64 = 120;

/// Read-only view of chain linkage.
///
/// Implementations own any I/O; this core never blocks behind the trait.
pub trait ChainLinker {
    /// Height of a committed block, or `None` for an unknown hash.
    fn height_of(&self, block_hash: &Hash) -> Option<u64>;

    /// Whether an output with the given unlock time is spendable at
    /// `current_height`.
    fn is_output_unlocked(&self, unlock_time: u64, current_height: u64) -> bool;
}

/// In-memory chain linkage with an explicit clock.
///
/// The clock is a plain field rather than a call to the system time so that
/// unlock checks are reproducible in tests and replays.
#[derive(Clone, Debug, Default)]
pub struct MemoryChain {
    heights: HashMap<Hash, u64>,
    tip: u64,
    now: u64,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block hash at the next height; returns that height.
    pub fn push_block(&mut self, hash: Hash) -> u64 {
        let height = self.tip;
        self.heights.insert(hash, height);
        self.tip += 1;
        height
    }

    /// Current tip height (one past the last committed block).
    pub fn tip(&self) -> u64 {
        self.tip
    }

    /// Set the wall clock used for timestamp-interpreted unlock times.
    pub fn set_clock(&mut self, unix_seconds: u64) {
        self.now = unix_seconds;
    }
}

impl ChainLinker for MemoryChain {
    fn height_of(&self, block_hash: &Hash) -> Option<u64> {
        self.heights.get(block_hash).copied()
    }

    fn is_output_unlocked(&self, unlock_time: u64, current_height: u64) -> bool {
        if unlock_time < UNLOCK_TIME_TIMESTAMP_THRESHOLD {
            current_height + UNLOCK_DELTA_BLOCKS >= unlock_time
        } else {
            self.now + UNLOCK_DELTA_SECONDS >= unlock_time
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_lookup() {
        let mut chain = MemoryChain::new();
        let h0 = chain.push_block([1u8; 32]);
        let h1 = chain.push_block([2u8; 32]);

        assert_eq!(h0, 0);
        assert_eq!(h1, 1);
        assert_eq!(chain.height_of(&[1u8; 32]), Some(0));
        assert_eq!(chain.height_of(&[9u8; 32]), None);
        assert_eq!(chain.tip(), 2);
    }

    #[test]
    fn test_height_interpreted_unlock() {
        let chain = MemoryChain::new();

        // Locked until height 100: spendable one block early.
        assert!(!chain.is_output_unlocked(100, 98));
        assert!(chain.is_output_unlocked(100, 99));
        assert!(chain.is_output_unlocked(100, 100));
    }

    #[test]
    fn test_timestamp_interpreted_unlock() {
        let mut chain = MemoryChain::new();
        let unlock = UNLOCK_TIME_TIMESTAMP_THRESHOLD + 10_000;

        chain.set_clock(unlock - UNLOCK_DELTA_SECONDS - 1);
        assert!(!chain.is_output_unlocked(unlock, 0));

        chain.set_clock(unlock - UNLOCK_DELTA_SECONDS);
        assert!(chain.is_output_unlocked(unlock, 0));
    }
}
