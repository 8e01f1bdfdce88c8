//! The `CryptoProvider` trait consumed by vote and registration validation.
//!
//! Fixed-size outputs, boolean verification outcomes, no panics. Validation
//! code takes a provider by reference so tests can substitute a deterministic
//! one without touching consensus logic.

use crate::hashing::{keccak256, keccak256_parts};
use crate::signatures::{self, SecretKey};
use ed25519_dalek::{Signer, SigningKey};
use shared_types::{Hash, KeyImage, NodePublicKey, Signature};

/// Domain-separation prefix for key-image derivation.
const KEY_IMAGE_DOMAIN: &[u8] = b"stakenet.key-image.v1";

/// Opaque cryptographic operations the consensus core depends on.
pub trait CryptoProvider {
    /// Sign `message` with the given secret seed.
    fn sign(&self, message: &[u8], secret: &SecretKey) -> Signature;

    /// Verify a signature; failure is a boolean, never an error.
    fn verify(&self, message: &[u8], public: &NodePublicKey, signature: &Signature) -> bool;

    /// 32-byte digest of arbitrary bytes.
    fn hash(&self, data: &[u8]) -> Hash;

    /// One-time spend tag for the output key pair.
    fn derive_key_image(&self, public: &NodePublicKey, secret: &SecretKey) -> KeyImage;
}

/// The shipped provider: Ed25519 signatures, Keccak-256 digests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Provider;

impl CryptoProvider for Ed25519Provider {
    fn sign(&self, message: &[u8], secret: &SecretKey) -> Signature {
        let signing_key = SigningKey::from_bytes(secret.as_bytes());
        signing_key.sign(message).to_bytes()
    }

    fn verify(&self, message: &[u8], public: &NodePublicKey, signature: &Signature) -> bool {
        signatures::verify(message, public, signature)
    }

    fn hash(&self, data: &[u8]) -> Hash {
        keccak256(data)
    }

    fn derive_key_image(&self, public: &NodePublicKey, secret: &SecretKey) -> KeyImage {
        KeyImage(keccak256_parts(&[
            KEY_IMAGE_DOMAIN,
            secret.as_bytes(),
            public.as_bytes(),
        ]))
    }
}
