//! Deregistration vote collection.
//!
//! Votes accumulate per (target height, target key). Each vote is validated
//! against the committee derived for that height; an invalid signature
//! rejects the vote but never the pool. At the vote threshold the target
//! transitions to deregistered exactly once, and every later vote for the
//! same target is an idempotent no-op.

use crate::config::QuorumConfig;
use crate::error::{VoteError, VoteResult};
use crate::quorum::QuorumState;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::CryptoProvider;
use shared_types::{NodePublicKey, Signature};
use std::collections::HashMap;

/// A signed vote to remove a tested node.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterVote {
    /// Height whose quorum is voting.
    pub target_height: u64,
    /// Position of the target in that quorum's tested pool.
    pub target_index: u32,
    /// Position of the voter in that quorum's committee.
    pub voter_index: u32,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl DeregisterVote {
    /// The message a vote signature commits to.
    pub fn signing_message(target_height: u64, target_index: u32) -> Vec<u8> {
        let mut message = Vec::with_capacity(16);
        message.extend_from_slice(&target_height.to_le_bytes());
        message.extend_from_slice(&u64::from(target_index).to_le_bytes());
        message
    }
}

/// Outcome of accepting a valid vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote counted; threshold not yet reached.
    Accepted { count: usize },
    /// This vote crossed the threshold: the caller must remove the target
    /// from the ledger. Reported exactly once per target.
    ThresholdReached { target: NodePublicKey },
    /// Target already deregistered; the vote is ignored.
    AlreadyDeregistered,
}

#[derive(Clone, Debug)]
struct VotePool {
    votes: Vec<DeregisterVote>,
    /// One bit per committee position; duplicate voters are rejected, not
    /// counted twice.
    seen: BitVec<u8, Msb0>,
    deregistered: bool,
}

impl VotePool {
    fn new(committee_size: usize) -> Self {
        Self {
            votes: Vec::new(),
            seen: bitvec![u8, Msb0; 0; committee_size],
            deregistered: false,
        }
    }
}

/// Accumulates deregistration votes per (height, target).
#[derive(Clone, Debug, Default)]
pub struct VoteCollector {
    config: QuorumConfig,
    pools: HashMap<(u64, NodePublicKey), VotePool>,
}

impl VoteCollector {
    pub fn new(config: QuorumConfig) -> Self {
        Self {
            config,
            pools: HashMap::new(),
        }
    }

    /// Validate and count one vote against the committee for its height.
    pub fn submit<P: CryptoProvider>(
        &mut self,
        vote: DeregisterVote,
        quorum: &QuorumState,
        provider: &P,
    ) -> VoteResult<VoteOutcome> {
        let target = quorum
            .tested(vote.target_index)
            .ok_or(VoteError::InvalidTargetIndex {
                index: vote.target_index,
                pool: quorum.to_test.len(),
            })?
            .key;
        let voter = quorum
            .voter(vote.voter_index)
            .ok_or(VoteError::InvalidVoterIndex {
                index: vote.voter_index,
                committee: quorum.voters.len(),
            })?
            .key;

        let message = DeregisterVote::signing_message(vote.target_height, vote.target_index);
        if !provider.verify(&message, &voter, &vote.signature) {
            return Err(VoteError::InvalidSignature {
                voter_index: vote.voter_index,
            });
        }

        let pool = self
            .pools
            .entry((vote.target_height, target))
            .or_insert_with(|| VotePool::new(quorum.voters.len()));

        if pool.deregistered {
            return Ok(VoteOutcome::AlreadyDeregistered);
        }
        if pool.seen[vote.voter_index as usize] {
            return Err(VoteError::DuplicateVoter {
                voter_index: vote.voter_index,
            });
        }

        pool.seen.set(vote.voter_index as usize, true);
        pool.votes.push(vote);

        if pool.votes.len() >= self.config.min_votes_to_kick {
            pool.deregistered = true;
            tracing::info!(
                node = ?target,
                height = vote.target_height,
                votes = pool.votes.len(),
                "deregistration threshold reached"
            );
            return Ok(VoteOutcome::ThresholdReached { target });
        }
        Ok(VoteOutcome::Accepted {
            count: pool.votes.len(),
        })
    }

    /// Count of valid votes collected for a target.
    pub fn votes_for(&self, target_height: u64, target: &NodePublicKey) -> usize {
        self.pools
            .get(&(target_height, *target))
            .map_or(0, |pool| pool.votes.len())
    }

    /// Whether a target already crossed the threshold. Distinguishes
    /// "deregistered, further votes are no-ops" from "expired, votes are
    /// stale".
    pub fn is_deregistered(&self, target_height: u64, target: &NodePublicKey) -> bool {
        self.pools
            .get(&(target_height, *target))
            .is_some_and(|pool| pool.deregistered)
    }

    /// Discard the pool for a target that reached threshold elsewhere or
    /// expired before threshold. Returns whether a pool existed.
    pub fn discard_target(&mut self, target_height: u64, target: &NodePublicKey) -> bool {
        self.pools.remove(&(target_height, *target)).is_some()
    }

    /// Discard every pool naming a node, across heights. Used when the node
    /// leaves the ledger for any reason.
    pub fn discard_node(&mut self, target: &NodePublicKey) {
        self.pools.retain(|(_, key), _| key != target);
    }
}

/// Validate a complete deregistration payload against its height's quorum:
/// threshold count, distinct voters, and every signature. Returns the target
/// key on success.
///
/// Stateless: a deregistration transaction carries its full vote list, so
/// validation does not depend on collector state.
pub fn validate_deregister_payload<P: CryptoProvider>(
    payload: &sn_wire::DeregisterPayload,
    quorum: &QuorumState,
    config: &QuorumConfig,
    provider: &P,
) -> VoteResult<NodePublicKey> {
    let target = quorum
        .tested(payload.target_index)
        .ok_or(VoteError::InvalidTargetIndex {
            index: payload.target_index,
            pool: quorum.to_test.len(),
        })?
        .key;

    let mut seen = bitvec![u8, Msb0; 0; quorum.voters.len()];
    let message = DeregisterVote::signing_message(payload.target_height, payload.target_index);
    let mut valid = 0usize;
    for vote in &payload.votes {
        let voter = quorum
            .voter(vote.voter_index)
            .ok_or(VoteError::InvalidVoterIndex {
                index: vote.voter_index,
                committee: quorum.voters.len(),
            })?
            .key;
        if seen[vote.voter_index as usize] {
            return Err(VoteError::DuplicateVoter {
                voter_index: vote.voter_index,
            });
        }
        if !provider.verify(&message, &voter, &vote.signature) {
            return Err(VoteError::InvalidSignature {
                voter_index: vote.voter_index,
            });
        }
        seen.set(vote.voter_index as usize, true);
        valid += 1;
    }

    if valid < config.min_votes_to_kick {
        return Err(VoteError::NotEnoughVotes {
            have: valid,
            need: config.min_votes_to_kick,
        });
    }
    Ok(target)
}
