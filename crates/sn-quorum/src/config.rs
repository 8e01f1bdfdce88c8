//! Configuration for quorum formation and deregistration voting.

use serde::Deserialize;

/// Default number of voters in a height's committee.
pub const DEFAULT_QUORUM_SIZE: usize = 10;

/// Default number of distinct valid votes required to deregister a node.
pub const DEFAULT_MIN_VOTES_TO_KICK: usize = 7;

/// Runtime configuration for quorum formation and voting.
#[derive(Clone, Debug, Deserialize)]
pub struct QuorumConfig {
    /// Committee size; quorum formation needs strictly more active nodes
    /// than this.
    pub quorum_size: usize,

    /// Votes required to remove a node before its natural expiry.
    pub min_votes_to_kick: usize,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            quorum_size: DEFAULT_QUORUM_SIZE,
            min_votes_to_kick: DEFAULT_MIN_VOTES_TO_KICK,
        }
    }
}
