//! Error types for the wire codec.
//!
//! Every variant means "reject this record"; none is fatal to the node.

use thiserror::Error;

/// Wire decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before the record did.
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Varint does not fit in 64 bits.
    #[error("Varint overflow at offset {offset}")]
    VarintOverflow { offset: usize },

    /// Declared collection length cannot fit in the remaining input.
    #[error("Declared length {declared} exceeds {remaining} remaining bytes")]
    LengthOutOfBounds { declared: u64, remaining: usize },

    /// Transaction version 0 or above the newest supported version.
    #[error("Unsupported transaction version {version}")]
    InvalidVersion { version: u64 },

    /// Unrecognized one-byte discriminant on a tagged variant.
    #[error("Unknown {what} discriminant {tag:#04x}")]
    UnknownVariant { what: &'static str, tag: u8 },

    /// Transaction type tag at or above the known-type count. This is a
    /// forward-compatibility boundary, not silently ignorable.
    #[error("Unknown transaction type tag {tag}")]
    UnknownType { tag: u8 },

    /// Output count does not match the per-output unlock-time count.
    #[error("Output count {outputs} does not match unlock-time count {unlock_times}")]
    FieldCountMismatch { outputs: usize, unlock_times: usize },

    /// Version-1 signature groups missing for inputs that require them.
    #[error("Input {input} expects {expected} ring signatures, found {found}")]
    SignatureCountMismatch {
        input: usize,
        expected: usize,
        found: usize,
    },

    /// A boolean wire flag holding something other than 0 or 1, or a nonzero
    /// padding byte.
    #[error("Invalid flag byte {value:#04x}")]
    InvalidFlag { value: u8 },

    /// Varint field holding a value its record field cannot represent.
    #[error("{what} value {value} out of range")]
    ValueOutOfRange { what: &'static str, value: u64 },

    /// Bytes left over after a self-delimiting record ended.
    #[error("{trailing} trailing bytes after record")]
    TrailingBytes { trailing: usize },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
