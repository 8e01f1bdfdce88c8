//! Cross-subsystem integration tests.

pub mod codec;
pub mod deregistration;
pub mod lifecycle;

use shared_crypto::NodeKeypair;
use shared_types::NodePublicKey;

/// Surface subsystem logs in test output; safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic keypairs for a fleet of test nodes.
pub fn test_keypairs(count: usize) -> Vec<NodeKeypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
            NodeKeypair::from_seed(seed)
        })
        .collect()
}

/// Find the keypair backing a public key.
pub fn keypair_for<'a>(keypairs: &'a [NodeKeypair], key: &NodePublicKey) -> &'a NodeKeypair {
    keypairs
        .iter()
        .find(|keypair| keypair.public_key() == *key)
        .expect("key belongs to the test fleet")
}
