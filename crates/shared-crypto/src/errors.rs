//! Error types for the crypto boundary.

use thiserror::Error;

/// Crypto provider errors.
///
/// Verification failures are ordinary boolean outcomes, not errors; this enum
/// covers malformed key material only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Bytes do not decode to a valid curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Seed bytes have the wrong length.
    #[error("Invalid secret key seed")]
    InvalidSecretKey,
}
