//! # sn-wire
//!
//! Versioned transaction/block records and their canonical wire codec.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Versioned records**: transaction prefix versions 1-4 with
//!   version-gated field presence, enforced on decode
//! - **Byte-exact encoding**: varint integers, one-byte variant
//!   discriminants, length-prefixed collections; self-delimiting
//! - **Content addressing**: cached Keccak-256 hashes with
//!   invalidate-on-mutation semantics
//! - **Tx-extra payloads**: registration and deregistration sub-records
//!
//! Codec operations are pure functions with no shared mutable state; they
//! are safe to invoke in parallel across independent records (see
//! [`transaction::decode_batch`]). Malformed input is always a typed
//! [`DecodeError`], never a panic.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sn_wire::{TransactionRecord, DecodeError};
//!
//! let record = TransactionRecord::decode(&blob)?;
//! assert!(!record.is_pruned());
//! let id = record.hash();
//! ```

pub mod block;
pub mod codec;
pub mod error;
pub mod extra;
pub mod transaction;

pub use block::{BlockHeader, BlockRecord};
pub use codec::{ByteReader, ByteWriter};
pub use error::{DecodeError, DecodeResult};
pub use extra::{
    build_extra, find_deregister, find_registration, parse_extra, ContributorSlot,
    DeregisterPayload, ExtraField, PayloadVote, RegistrationPayload,
};
pub use transaction::{
    absolute_key_offsets, decode_batch, RctScheme, RingCtSignature, TransactionPrefix,
    TransactionRecord, TxInput, TxOutTarget, TxOutput, TxType, TxVersion, TX_TYPE_COUNT,
};
