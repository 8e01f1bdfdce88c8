//! # Shared Crypto - Provider Boundary
//!
//! The consensus core treats cryptography as an opaque provider: fixed-size
//! digests, sign/verify with boolean outcomes, and key-image derivation. This
//! crate is the shipped implementation of that boundary.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Content addressing, shuffle seeding |
//! | `signatures` | Ed25519 | Vote and registration signing |
//! | `provider` | — | The `CryptoProvider` trait consumed by validation |
//!
//! ## Security Properties
//!
//! - **Ed25519**: deterministic nonces, no RNG dependency at signing time
//! - **Key material**: secret seeds zeroized on drop

pub mod errors;
pub mod hashing;
pub mod provider;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_parts};
pub use provider::{CryptoProvider, Ed25519Provider};
pub use signatures::{verify, NodeKeypair, SecretKey};
