//! Reward-winner selection.
//!
//! The next block reward goes to the least-recently-rewarded active node: the
//! lexicographically smallest `last_reward` marker, where a never-rewarded
//! node (`None`) sorts before every rewarded one. Ties fall back to
//! registration order, which is only reachable among never-rewarded nodes
//! since markers are unique once set.

use crate::error::LedgerResult;
use crate::ledger::{RewardMarker, StakeLedger};
use shared_types::NodePublicKey;

/// Pick the reward winner for `height` and advance its marker to
/// `(height, 0)`.
///
/// The marker update is the only state mutation here, and callers must apply
/// it before running expiry for the same height. Returns `Ok(None)` on an
/// empty ledger; the caller falls back to the null recipient.
pub fn pick_winner(ledger: &mut StakeLedger, height: u64) -> LedgerResult<Option<NodePublicKey>> {
    let winner = ledger
        .iter()
        .min_by_key(|node| (node.last_reward, node.registered_seq()))
        .map(|node| node.public_key);

    let Some(winner) = winner else {
        return Ok(None);
    };

    ledger.record_reward(
        winner,
        RewardMarker {
            height,
            priority: 0,
        },
    )?;
    tracing::info!(node = ?winner, height, "reward winner selected");
    Ok(Some(winner))
}
