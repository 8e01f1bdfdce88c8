//! # Ed25519 Signatures
//!
//! Node identity keys, vote signatures, and registration signatures are all
//! Ed25519 over the caller-supplied message bytes.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{NodePublicKey, Signature};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret seed for a node keypair (32 bytes). Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A node's Ed25519 keypair, stored as the secret seed.
pub struct NodeKeypair {
    seed: SecretKey,
}

impl NodeKeypair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self {
            seed: SecretKey(signing_key.to_bytes()),
        }
    }

    /// Rebuild a keypair from its secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            seed: SecretKey(seed),
        }
    }

    /// The public half, as the ledger identifies nodes.
    pub fn public_key(&self) -> NodePublicKey {
        let signing_key = SigningKey::from_bytes(&self.seed.0);
        NodePublicKey(signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Deterministic; no RNG at signing time.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let signing_key = SigningKey::from_bytes(&self.seed.0);
        signing_key.sign(message).to_bytes()
    }

    /// The secret seed, for provider operations that need it.
    pub fn secret(&self) -> &SecretKey {
        &self.seed
    }
}

/// Verify a signature. Malformed public keys simply fail verification.
pub fn verify(message: &[u8], public: &NodePublicKey, signature: &Signature) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key.verify(message, &sig).is_ok()
}
