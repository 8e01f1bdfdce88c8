//! End-to-end deregistration: register a fleet, derive a quorum from a fixed
//! block hash, vote a node out, and check expiry afterwards.

#![cfg(test)]

use super::{keypair_for, test_keypairs};
use shared_crypto::Ed25519Provider;
use shared_types::Address;
use sn_quorum::{BlockProcessor, DeregisterVote, ProcessError, QuorumConfig, VoteError, VoteOutcome};
use sn_registry::{RegistryConfig, FULL_STAKE_PORTIONS};
use sn_wire::{
    BlockHeader, BlockRecord, RingCtSignature, TransactionPrefix, TransactionRecord, TxInput,
    TxVersion,
};

const FLEET: usize = 20;
const VOTE_HEIGHT: u64 = 50;

fn block_at(height: u64) -> BlockRecord {
    let prefix = TransactionPrefix {
        version: TxVersion::V2,
        inputs: vec![TxInput::Generation { height }],
        ..Default::default()
    };
    let coinbase = TransactionRecord::with_ringct(prefix, RingCtSignature::null());
    let header = BlockHeader {
        major_version: 9,
        minor_version: 9,
        timestamp: 1_700_000_000,
        prev_id: [0x48u8; 32],
        nonce: height as u32,
    };
    BlockRecord::new(header, coinbase, Vec::new())
}

/// A processor with `FLEET` registered nodes, all expiring at height 100,
/// advanced through a block at the vote height so its quorum is cached.
fn voting_fixture() -> (BlockProcessor<Ed25519Provider>, Vec<shared_crypto::NodeKeypair>) {
    let processor = BlockProcessor::new(
        RegistryConfig::default(),
        QuorumConfig::default(),
        Ed25519Provider,
    );
    let keypairs = test_keypairs(FLEET);
    {
        let mut ledger = processor.ledger().write();
        for (i, keypair) in keypairs.iter().enumerate() {
            ledger
                .register(
                    keypair.public_key(),
                    &[(Address::new([i as u8; 32]), FULL_STAKE_PORTIONS)],
                    100,
                )
                .unwrap();
        }
    }
    processor
        .process_block(&block_at(VOTE_HEIGHT), &[], VOTE_HEIGHT)
        .unwrap();
    (processor, keypairs)
}

fn signed_vote(
    processor: &BlockProcessor<Ed25519Provider>,
    keypairs: &[shared_crypto::NodeKeypair],
    voter_index: u32,
    target_index: u32,
) -> DeregisterVote {
    let quorum = processor.quorum_for(VOTE_HEIGHT).unwrap();
    let voter_key = quorum.voter(voter_index).unwrap().key;
    let message = DeregisterVote::signing_message(VOTE_HEIGHT, target_index);
    DeregisterVote {
        target_height: VOTE_HEIGHT,
        target_index,
        voter_index,
        signature: keypair_for(keypairs, &voter_key).sign(&message),
    }
}

#[test]
fn test_threshold_vote_removes_target_then_expiry_is_noop() {
    super::init_tracing();
    let (processor, keypairs) = voting_fixture();
    let threshold = QuorumConfig::default().min_votes_to_kick;

    let quorum = processor.quorum_for(VOTE_HEIGHT).unwrap();
    let target = quorum.tested(0).unwrap().key;
    assert!(processor.ledger().read().contains(&target));

    // threshold - 1 distinct votes leave the target active.
    for voter in 0..threshold - 1 {
        let outcome = processor
            .submit_vote(signed_vote(&processor, &keypairs, voter as u32, 0))
            .unwrap();
        assert_eq!(outcome, VoteOutcome::Accepted { count: voter + 1 });
        assert!(processor.ledger().read().contains(&target));
    }

    // The threshold-th vote removes the target immediately.
    let outcome = processor
        .submit_vote(signed_vote(&processor, &keypairs, (threshold - 1) as u32, 0))
        .unwrap();
    assert_eq!(outcome, VoteOutcome::ThresholdReached { target });
    assert!(!processor.ledger().read().contains(&target));

    // A further vote is an idempotent no-op, not a second removal.
    let outcome = processor
        .submit_vote(signed_vote(&processor, &keypairs, threshold as u32, 0))
        .unwrap();
    assert_eq!(outcome, VoteOutcome::AlreadyDeregistered);

    // Natural expiry at height 100 is a no-op for the removed node: the
    // sweep reports only survivors with lower expiry heights (none here).
    let expired = processor.ledger().write().expire(100);
    assert!(!expired.contains(&target));
    assert_eq!(processor.ledger().read().len(), FLEET - 1);
}

#[test]
fn test_duplicate_voter_counts_once() {
    let (processor, keypairs) = voting_fixture();
    let quorum = processor.quorum_for(VOTE_HEIGHT).unwrap();
    let target = quorum.tested(0).unwrap().key;

    processor
        .submit_vote(signed_vote(&processor, &keypairs, 2, 0))
        .unwrap();
    let second = processor.submit_vote(signed_vote(&processor, &keypairs, 2, 0));

    assert_eq!(
        second,
        Err(ProcessError::Vote(VoteError::DuplicateVoter {
            voter_index: 2
        }))
    );
    assert!(processor.ledger().read().contains(&target));
}

#[test]
fn test_expired_target_votes_are_stale() {
    let (processor, keypairs) = voting_fixture();
    let quorum = processor.quorum_for(VOTE_HEIGHT).unwrap();
    let target = quorum.tested(0).unwrap().key;

    // Partial vote set, then the whole fleet expires naturally.
    processor
        .submit_vote(signed_vote(&processor, &keypairs, 0, 0))
        .unwrap();
    processor.ledger().write().expire(1_000);
    assert!(!processor.ledger().read().contains(&target));

    let result = processor.submit_vote(signed_vote(&processor, &keypairs, 1, 0));
    assert_eq!(
        result,
        Err(ProcessError::Vote(VoteError::StaleTarget {
            height: VOTE_HEIGHT,
            index: 0,
        }))
    );
}

#[test]
fn test_forged_vote_rejected_without_poisoning_pool() {
    let (processor, keypairs) = voting_fixture();
    let threshold = QuorumConfig::default().min_votes_to_kick;
    let quorum = processor.quorum_for(VOTE_HEIGHT).unwrap();
    let target = quorum.tested(0).unwrap().key;

    let mut forged = signed_vote(&processor, &keypairs, 0, 0);
    forged.signature = [0u8; 64];
    assert_eq!(
        processor.submit_vote(forged),
        Err(ProcessError::Vote(VoteError::InvalidSignature {
            voter_index: 0
        }))
    );

    // The full threshold of honest votes still lands.
    for voter in 0..threshold {
        processor
            .submit_vote(signed_vote(&processor, &keypairs, voter as u32, 0))
            .unwrap();
    }
    assert!(!processor.ledger().read().contains(&target));
}
