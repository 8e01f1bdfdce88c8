//! Per-block processing.
//!
//! The ledger is the one genuinely contended resource in the core, and
//! partial application (winner picked but expiry not yet applied) must never
//! be observable. `BlockProcessor` therefore acquires the ledger exclusively
//! for the whole of a block step: winner selection, registration intake,
//! deregistration, then expiry, in that order. Codec and quorum derivation
//! stay pure and lock-free.
//!
//! Lock order everywhere: ledger, then collector; the quorum cache is only
//! held briefly and never while waiting on the others from outside a block
//! step.

use crate::config::QuorumConfig;
use crate::dereg::{validate_deregister_payload, DeregisterVote, VoteCollector, VoteOutcome};
use crate::error::{ProcessError, ProcessResult, VoteError};
use crate::quorum::{QuorumGenerator, QuorumState};
use parking_lot::{Mutex, RwLock};
use shared_crypto::{keccak256, CryptoProvider};
use shared_types::{Address, KeyImage, NodePublicKey};
use sn_registry::{pick_winner, RegistryConfig, StakeLedger};
use sn_wire::{
    find_deregister, find_registration, BlockRecord, TransactionRecord, TxInput, TxType,
};
use std::collections::{BTreeSet, HashMap};

/// What a block step changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: u64,
    /// Reward recipient, or `None` when the ledger was empty (the caller
    /// falls back to the null recipient).
    pub winner: Option<NodePublicKey>,
    pub registered: Vec<NodePublicKey>,
    pub deregistered: Vec<NodePublicKey>,
    pub expired: Vec<NodePublicKey>,
    /// Whether enough nodes remained to form this height's quorum.
    pub quorum_formed: bool,
}

/// Applies blocks to the stake ledger as one atomic step each.
pub struct BlockProcessor<P: CryptoProvider> {
    ledger: RwLock<StakeLedger>,
    collector: Mutex<VoteCollector>,
    generator: QuorumGenerator,
    quorums: Mutex<HashMap<u64, QuorumState>>,
    /// Key images spent by committed transactions; a repeat is a double
    /// spend and rejects the block.
    spent_key_images: Mutex<BTreeSet<KeyImage>>,
    provider: P,
}

impl<P: CryptoProvider> BlockProcessor<P> {
    pub fn new(
        registry_config: RegistryConfig,
        quorum_config: QuorumConfig,
        provider: P,
    ) -> Self {
        Self {
            ledger: RwLock::new(StakeLedger::new(registry_config)),
            collector: Mutex::new(VoteCollector::new(quorum_config.clone())),
            generator: QuorumGenerator::new(quorum_config),
            quorums: Mutex::new(HashMap::new()),
            spent_key_images: Mutex::new(BTreeSet::new()),
            provider,
        }
    }

    /// The shared ledger. Callers outside a block step take read access;
    /// block application holds the write half for its full duration.
    pub fn ledger(&self) -> &RwLock<StakeLedger> {
        &self.ledger
    }

    /// The cached quorum for a processed height.
    pub fn quorum_for(&self, height: u64) -> Option<QuorumState> {
        self.quorums.lock().get(&height).cloned()
    }

    /// Apply one block at `height`, strictly in block order.
    ///
    /// `txs` are the block's non-coinbase transactions, already decoded.
    /// Any error rejects the whole block: the ledger is only mutated behind
    /// the write lock held for the entire step, and callers must discard the
    /// processor state on a failed block (re-sync from the previous one).
    pub fn process_block(
        &self,
        block: &BlockRecord,
        txs: &[TransactionRecord],
        height: u64,
    ) -> ProcessResult<BlockOutcome> {
        let block_hash = keccak256(&block.encode());

        let mut ledger = self.ledger.write();
        let mut collector = self.collector.lock();
        let mut spent = self.spent_key_images.lock();

        // Validation pass before any mutation: pruned records are unusable
        // for consensus re-checks, and every key image must be fresh both
        // against history and within the block.
        let mut block_images = Vec::new();
        for tx in txs {
            if tx.is_pruned() {
                return Err(ProcessError::PrunedTransaction);
            }
            for input in &tx.prefix().inputs {
                if let TxInput::ToKey { key_image, .. } = input {
                    if spent.contains(key_image) || block_images.contains(key_image) {
                        return Err(ProcessError::DuplicateKeyImage {
                            key_image: *key_image,
                        });
                    }
                    block_images.push(*key_image);
                }
            }
        }

        // Winner first: the marker update must land before expiry sweeps
        // the same height.
        let winner = pick_winner(&mut ledger, height)?;

        let mut registered = Vec::new();
        let mut deregistered = Vec::new();
        for tx in txs {
            if let Some(registration) = find_registration(&tx.prefix().extra)? {
                if !registration.verify(&self.provider) {
                    return Err(ProcessError::InvalidRegistration {
                        node: registration.node_key,
                    });
                }
                if registration.expiration < block.header().timestamp {
                    return Err(ProcessError::ExpiredRegistration {
                        node: registration.node_key,
                        expiration: registration.expiration,
                    });
                }
                let slots: Vec<(Address, u64)> = registration
                    .contributors
                    .iter()
                    .map(|slot| (slot.address, slot.portion))
                    .collect();
                let expiry_height = height + ledger.config().stake_lock_blocks;
                ledger.register(registration.node_key, &slots, expiry_height)?;
                registered.push(registration.node_key);
            }

            if tx.prefix().tx_type == TxType::Deregister {
                let payload = find_deregister(&tx.prefix().extra)?
                    .ok_or(ProcessError::MissingDeregisterPayload)?;
                let quorum = {
                    let quorums = self.quorums.lock();
                    quorums
                        .get(&payload.target_height)
                        .cloned()
                        .ok_or(VoteError::NoQuorum {
                            height: payload.target_height,
                        })?
                };
                let target = validate_deregister_payload(
                    &payload,
                    &quorum,
                    self.generator.config(),
                    &self.provider,
                )?;
                if ledger.remove(&target).is_none() {
                    return Err(VoteError::StaleTarget {
                        height: payload.target_height,
                        index: payload.target_index,
                    }
                    .into());
                }
                collector.discard_node(&target);
                deregistered.push(target);
            }
        }

        spent.extend(block_images);

        let expired = ledger.expire(height);
        for key in &expired {
            collector.discard_node(key);
        }

        // This height's quorum is derived over the post-block active set.
        let quorum = self.generator.generate(&block_hash, &ledger.active_nodes());
        let quorum_formed = quorum.is_some();
        if let Some(quorum) = quorum {
            self.quorums.lock().insert(height, quorum);
        }

        tracing::info!(
            height,
            ?winner,
            registered = registered.len(),
            deregistered = deregistered.len(),
            expired = expired.len(),
            quorum_formed,
            "block processed"
        );
        Ok(BlockOutcome {
            height,
            winner,
            registered,
            deregistered,
            expired,
            quorum_formed,
        })
    }

    /// Validate and count a live vote against its height's cached quorum.
    /// Crossing the threshold removes the target from the ledger exactly
    /// once; later votes are idempotent no-ops.
    pub fn submit_vote(&self, vote: DeregisterVote) -> ProcessResult<VoteOutcome> {
        let quorum = self
            .quorum_for(vote.target_height)
            .ok_or(VoteError::NoQuorum {
                height: vote.target_height,
            })?;
        let target = quorum
            .tested(vote.target_index)
            .ok_or(VoteError::InvalidTargetIndex {
                index: vote.target_index,
                pool: quorum.to_test.len(),
            })?
            .key;

        let mut ledger = self.ledger.write();
        let mut collector = self.collector.lock();

        // A target gone from the ledger is stale unless it left through this
        // very vote pool, in which case further votes are idempotent no-ops.
        if !ledger.contains(&target) && !collector.is_deregistered(vote.target_height, &target) {
            return Err(VoteError::StaleTarget {
                height: vote.target_height,
                index: vote.target_index,
            }
            .into());
        }

        let outcome = collector.submit(vote, &quorum, &self.provider)?;
        if let VoteOutcome::ThresholdReached { target } = &outcome {
            ledger.remove(target);
        }
        Ok(outcome)
    }
}
