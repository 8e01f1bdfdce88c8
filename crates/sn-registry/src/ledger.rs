//! Stake-contribution ledger.
//!
//! Tracks per-node contributor stakes, expiry heights, and the
//! reward-eligibility marker. Storage is a `BTreeMap` keyed by public key so
//! iteration order is canonical: two ledgers independently rebuilt from the
//! same event history are byte-identical, which later quorum derivation
//! depends on.

use crate::config::{RegistryConfig, FULL_STAKE_PORTIONS};
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, KeyImage, NodePublicKey};
use std::collections::BTreeMap;

/// When a node last won the block reward: (height, intra-block priority).
///
/// Strictly increasing across a node's lifetime once set; compared
/// lexicographically for winner selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardMarker {
    pub height: u64,
    pub priority: u32,
}

/// One contributor's reserved share and locked amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub address: Address,
    /// Reserved share of the total stake, out of [`FULL_STAKE_PORTIONS`].
    pub portion: u64,
    /// Amount locked so far via registration and top-ups.
    pub amount: u64,
    /// Key image locking the contribution output, when known.
    pub locked_key_image: Option<KeyImage>,
}

/// An active node's registration state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRegistration {
    pub public_key: NodePublicKey,
    pub contributors: Vec<Contributor>,
    /// Height at which the stake unlocks naturally.
    pub expiry_height: u64,
    /// `None` until the node first wins a reward.
    pub last_reward: Option<RewardMarker>,
    registered_seq: u64,
}

impl NodeRegistration {
    /// Total amount locked across all contributors.
    pub fn total_contributed(&self) -> u64 {
        self.contributors
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.amount))
    }

    /// Registration order; breaks winner-selection ties between nodes that
    /// have never won.
    pub fn registered_seq(&self) -> u64 {
        self.registered_seq
    }
}

/// The set of active nodes and their stakes.
#[derive(Clone, Debug, Default)]
pub struct StakeLedger {
    config: RegistryConfig,
    nodes: BTreeMap<NodePublicKey, NodeRegistration>,
    next_seq: u64,
}

impl StakeLedger {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            nodes: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new node with its reserved contributor slots.
    ///
    /// Portions must be non-zero and sum to exactly the full stake unit.
    pub fn register(
        &mut self,
        public_key: NodePublicKey,
        contributors: &[(Address, u64)],
        expiry_height: u64,
    ) -> LedgerResult<()> {
        if self.nodes.contains_key(&public_key) {
            return Err(LedgerError::DuplicateKey { key: public_key });
        }
        if contributors.is_empty() {
            return Err(LedgerError::InvalidContribution {
                reason: "empty contributor list".into(),
            });
        }
        if contributors.iter().any(|(_, portion)| *portion == 0) {
            return Err(LedgerError::InvalidContribution {
                reason: "zero portion".into(),
            });
        }
        let total: u128 = contributors.iter().map(|(_, p)| u128::from(*p)).sum();
        if total != u128::from(FULL_STAKE_PORTIONS) {
            return Err(LedgerError::InvalidContribution {
                reason: format!("portions sum to {total}, expected {FULL_STAKE_PORTIONS}"),
            });
        }

        let registration = NodeRegistration {
            public_key,
            contributors: contributors
                .iter()
                .map(|(address, portion)| Contributor {
                    address: *address,
                    portion: *portion,
                    amount: 0,
                    locked_key_image: None,
                })
                .collect(),
            expiry_height,
            last_reward: None,
            registered_seq: self.next_seq,
        };
        self.next_seq += 1;
        self.nodes.insert(public_key, registration);

        tracing::info!(
            node = ?public_key,
            expiry_height,
            "service node registered"
        );
        Ok(())
    }

    /// Add a locked contribution toward the staking requirement.
    pub fn top_up(
        &mut self,
        public_key: NodePublicKey,
        contributor: Address,
        amount: u64,
    ) -> LedgerResult<()> {
        let requirement = self.config.staking_requirement;
        let node = self
            .nodes
            .get_mut(&public_key)
            .ok_or(LedgerError::UnknownNode { key: public_key })?;

        if node.total_contributed() >= requirement {
            return Err(LedgerError::NotAcceptingContributions { key: public_key });
        }
        let slot = node
            .contributors
            .iter_mut()
            .find(|c| c.address == contributor)
            .ok_or(LedgerError::UnknownContributor { key: public_key })?;

        slot.amount = slot.amount.saturating_add(amount);
        tracing::debug!(node = ?public_key, amount, "stake contribution added");
        Ok(())
    }

    /// Sweep naturally-expired nodes: every node whose `expiry_height` is
    /// strictly below the configured cutoff for `height`. Unconditional,
    /// carries no reward, and idempotent for a given height.
    pub fn expire(&mut self, height: u64) -> Vec<NodePublicKey> {
        let cutoff = self.config.expiry_rule.cutoff(height);
        let expired: Vec<NodePublicKey> = self
            .nodes
            .values()
            .filter(|node| node.expiry_height < cutoff)
            .map(|node| node.public_key)
            .collect();
        for key in &expired {
            self.nodes.remove(key);
            tracing::info!(node = ?key, height, "service node expired");
        }
        expired
    }

    /// Penalized removal by a successful deregistration: immediate, no
    /// grace, no refund of the remaining lock.
    pub fn remove(&mut self, public_key: &NodePublicKey) -> Option<NodeRegistration> {
        let removed = self.nodes.remove(public_key);
        if removed.is_some() {
            tracing::warn!(node = ?public_key, "service node deregistered");
        }
        removed
    }

    /// Record a reward win. The marker must strictly increase.
    pub fn record_reward(
        &mut self,
        public_key: NodePublicKey,
        marker: RewardMarker,
    ) -> LedgerResult<()> {
        let node = self
            .nodes
            .get_mut(&public_key)
            .ok_or(LedgerError::UnknownNode { key: public_key })?;

        if let Some(previous) = node.last_reward {
            if marker <= previous {
                debug_assert!(false, "reward marker went backwards: {previous:?} -> {marker:?}");
                tracing::error!(
                    node = ?public_key,
                    ?previous,
                    ?marker,
                    "reward marker went backwards"
                );
                return Err(LedgerError::InternalInconsistency {
                    reason: format!("reward marker went backwards: {previous:?} -> {marker:?}"),
                });
            }
        }
        node.last_reward = Some(marker);
        Ok(())
    }

    pub fn get(&self, public_key: &NodePublicKey) -> Option<&NodeRegistration> {
        self.nodes.get(public_key)
    }

    pub fn contains(&self, public_key: &NodePublicKey) -> bool {
        self.nodes.contains_key(public_key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Active nodes in canonical (public-key) order.
    pub fn active_nodes(&self) -> Vec<NodePublicKey> {
        self.nodes.keys().copied().collect()
    }

    /// Registrations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRegistration> {
        self.nodes.values()
    }
}
