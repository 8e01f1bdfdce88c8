//! # Keccak-256 Hashing
//!
//! All content addressing in the core (transaction hashes, block identity,
//! quorum shuffle state) uses Keccak-256.

use shared_types::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 digest of a byte slice.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Keccak-256 digest of several concatenated parts, without an intermediate
/// allocation.
pub fn keccak256_parts(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vector() {
        // Keccak-256 of the empty string.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_parts_equal_concatenation() {
        assert_eq!(keccak256_parts(&[b"ab", b"cd"]), keccak256(b"abcd"));
    }
}
