//! Deterministic quorum derivation.
//!
//! Each height's committee is derived from the block hash alone: the first
//! eight bytes seed a Keccak-chained Fisher-Yates shuffle over the canonical
//! active-node list, the first `quorum_size` shuffled positions become the
//! voters and the remainder the tested pool. Two independent computations
//! over the same inputs are bit-identical; that is the basis of distributed
//! agreement on deregistrations.

use crate::config::QuorumConfig;
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256_parts;
use shared_types::{Hash, NodePublicKey};

/// One node's slot in a quorum, paired with its shuffled-order position:
/// `0..quorum_size` for voters, `quorum_size..len` for the tested pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumEntry {
    pub key: NodePublicKey,
    pub index: u64,
}

/// The two disjoint node sets derived for a height.
///
/// Derived, never persisted: always recomputable from `(block_hash,
/// active_nodes)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuorumState {
    pub voters: Vec<QuorumEntry>,
    pub to_test: Vec<QuorumEntry>,
}

impl QuorumState {
    /// Committee member at the given voter position.
    pub fn voter(&self, index: u32) -> Option<&QuorumEntry> {
        self.voters.get(index as usize)
    }

    /// Tested node at the given pool position.
    pub fn tested(&self, index: u32) -> Option<&QuorumEntry> {
        self.to_test.get(index as usize)
    }
}

/// Derives voter/tested committees from block hashes.
#[derive(Clone, Debug, Default)]
pub struct QuorumGenerator {
    config: QuorumConfig,
}

impl QuorumGenerator {
    pub fn new(config: QuorumConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuorumConfig {
        &self.config
    }

    /// Derive the quorum for a block hash over the canonically-ordered
    /// active-node list.
    ///
    /// Returns `None` when there are not strictly more nodes than the
    /// committee size: "no quorum available this height", never a partial
    /// or truncated committee.
    pub fn generate(
        &self,
        block_hash: &Hash,
        active_nodes: &[NodePublicKey],
    ) -> Option<QuorumState> {
        let quorum_size = self.config.quorum_size;
        if active_nodes.len() <= quorum_size {
            return None;
        }

        let order = shuffled_indices(active_nodes.len(), seed_from_hash(block_hash));
        let voters = order[..quorum_size]
            .iter()
            .enumerate()
            .map(|(position, &node)| QuorumEntry {
                key: active_nodes[node],
                index: position as u64,
            })
            .collect();
        let to_test = order[quorum_size..]
            .iter()
            .enumerate()
            .map(|(position, &node)| QuorumEntry {
                key: active_nodes[node],
                index: (quorum_size + position) as u64,
            })
            .collect();

        Some(QuorumState { voters, to_test })
    }
}

/// Shuffle seed: the first eight bytes of the block hash, little-endian.
pub fn seed_from_hash(block_hash: &Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&block_hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Seeded Fisher-Yates permutation of `0..count`.
///
/// The random stream is a Keccak chain over the seed and swap position, so
/// the permutation depends on nothing but its arguments.
pub fn shuffled_indices(count: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();
    if count <= 1 {
        return order;
    }

    let mut state = keccak256_parts(&[&seed.to_le_bytes()]);
    for i in (1..count).rev() {
        state = keccak256_parts(&[&state, &(i as u64).to_le_bytes()]);
        let mut word = [0u8; 8];
        word.copy_from_slice(&state[..8]);
        let j = (u64::from_le_bytes(word) % (i as u64 + 1)) as usize;
        order.swap(i, j);
    }
    order
}
