//! Versioned transaction records and their canonical wire codec.
//!
//! The prefix fields live in [`TransactionPrefix`], embedded by value in
//! [`TransactionRecord`] together with the version-gated signature payload:
//! per-input classic signatures at version 1, a single embedded ring-CT
//! structure at version 2 and above, never both. Field presence per version
//! is enforced on decode, not just encode.
//!
//! Derived hash and blob size are cached and invalidated by every mutating
//! accessor; decode leaves both caches unset.

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{DecodeError, DecodeResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::keccak256;
use shared_types::{Cached, Hash, KeyImage, Signature};

const TAG_TXIN_TO_SCRIPT: u8 = 0x00;
const TAG_TXIN_TO_SCRIPT_HASH: u8 = 0x01;
const TAG_TXIN_TO_KEY: u8 = 0x02;
const TAG_TXIN_GENERATION: u8 = 0xff;

const TAG_TXOUT_TO_SCRIPT: u8 = 0x00;
const TAG_TXOUT_TO_SCRIPT_HASH: u8 = 0x01;
const TAG_TXOUT_TO_KEY: u8 = 0x02;

/// Transaction format versions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TxVersion {
    /// Classic per-input ring signatures.
    #[default]
    V1 = 1,
    /// Ring-CT signatures.
    V2 = 2,
    /// Per-output unlock times and the legacy deregister flag.
    V3 = 3,
    /// Explicit transaction type tag.
    V4 = 4,
}

impl TxVersion {
    /// Decode a wire version. Zero and anything above the newest version are
    /// rejected, never clamped.
    pub fn from_wire(version: u64) -> DecodeResult<Self> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            _ => Err(DecodeError::InvalidVersion { version }),
        }
    }

    pub fn to_wire(self) -> u64 {
        self as u64
    }
}

/// Transaction type, explicit on the wire from version 4.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TxType {
    #[default]
    Standard = 0,
    Deregister = 1,
    KeyImageUnlock = 2,
}

/// Number of known transaction types; any wire tag at or above this fails
/// decode.
pub const TX_TYPE_COUNT: u8 = 3;

impl TxType {
    pub fn from_wire(tag: u8) -> DecodeResult<Self> {
        match tag {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Deregister),
            2 => Ok(Self::KeyImageUnlock),
            _ => Err(DecodeError::UnknownType { tag }),
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// Transaction input variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxInput {
    /// Coinbase input minting the block reward at `height`.
    Generation { height: u64 },
    ToScript {
        prev: Hash,
        prevout: u64,
        sigset: Vec<u8>,
    },
    ToScriptHash {
        prev: Hash,
        prevout: u64,
        script: Vec<u8>,
    },
    /// Spend of a one-time output key through a ring of decoys.
    ToKey {
        amount: u64,
        /// Relative offsets into the global output set; the first is
        /// absolute, each subsequent is a delta.
        key_offsets: Vec<u64>,
        key_image: KeyImage,
    },
}

impl TxInput {
    /// Number of classic signatures this input carries at version 1: the
    /// ring size for `ToKey`, zero for every other kind.
    pub fn signature_arity(&self) -> usize {
        match self {
            Self::ToKey { key_offsets, .. } => key_offsets.len(),
            _ => 0,
        }
    }
}

/// Convert relative key offsets to absolute positions in the output set.
pub fn absolute_key_offsets(relative: &[u64]) -> Vec<u64> {
    let mut absolute = Vec::with_capacity(relative.len());
    let mut acc = 0u64;
    for offset in relative {
        acc = acc.wrapping_add(*offset);
        absolute.push(acc);
    }
    absolute
}

/// Transaction output destination variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutTarget {
    ToScript { keys: Vec<[u8; 32]>, script: Vec<u8> },
    ToScriptHash { hash: Hash },
    ToKey { key: [u8; 32] },
}

/// A single transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub amount: u64,
    pub target: TxOutTarget,
}

/// Ring-CT signature scheme identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RctScheme {
    /// No proof data (coinbase transactions).
    #[default]
    Null = 0,
    Full = 1,
    Simple = 2,
    Bulletproof = 3,
}

impl RctScheme {
    pub fn from_wire(tag: u8) -> DecodeResult<Self> {
        match tag {
            0 => Ok(Self::Null),
            1 => Ok(Self::Full),
            2 => Ok(Self::Simple),
            3 => Ok(Self::Bulletproof),
            _ => Err(DecodeError::UnknownVariant {
                what: "ring-CT scheme",
                tag,
            }),
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// Embedded ring-CT signature structure.
///
/// The internal layout of `base` and `prunable` is owned by the crypto
/// provider's wire contract; this codec only enforces the top-level
/// presence rule (present iff the input list is non-empty) and the pruning
/// boundary between the two blobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RingCtSignature {
    pub scheme: RctScheme,
    pub base: Vec<u8>,
    pub prunable: Vec<u8>,
}

impl RingCtSignature {
    /// The proof-free signature carried by coinbase transactions.
    pub fn null() -> Self {
        Self::default()
    }
}

/// The prefix fields common to every transaction version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionPrefix {
    pub version: TxVersion,
    /// Global unlock height/timestamp; consensus-meaningful only up to
    /// version 2, but always on the wire.
    pub unlock_time: u64,
    /// One unlock time per output, wire-present from version 3.
    pub per_output_unlock_times: Vec<u64>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Opaque sub-record stream; see [`crate::extra`].
    pub extra: Vec<u8>,
    pub tx_type: TxType,
}

impl TransactionPrefix {
    /// Whether `tx_type` is expressible at `version`: versions 1-2 carry
    /// only `Standard`, version 3 adds `Deregister` through the legacy
    /// flag, version 4 carries the full tag.
    pub fn version_permits_type(&self) -> bool {
        match self.version {
            TxVersion::V1 | TxVersion::V2 => self.tx_type == TxType::Standard,
            TxVersion::V3 => matches!(self.tx_type, TxType::Standard | TxType::Deregister),
            TxVersion::V4 => true,
        }
    }
}

/// A full or pruned transaction record.
///
/// Either "full" (signatures/proofs present) or "pruned" (proofs stripped,
/// flag set). Pruned records fail re-validation and are never usable for
/// consensus re-checks.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TransactionRecord {
    prefix: TransactionPrefix,
    /// Version-1 classic signatures, one group per input.
    #[serde_as(as = "Vec<Vec<Bytes>>")]
    signatures: Vec<Vec<Signature>>,
    /// Version-2+ embedded ring-CT structure.
    ringct: Option<RingCtSignature>,
    pruned: bool,
    #[serde(skip)]
    hash: Cached<Hash>,
    #[serde(skip)]
    blob_size: Cached<u64>,
}

impl PartialEq for TransactionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.signatures == other.signatures
            && self.ringct == other.ringct
            && self.pruned == other.pruned
    }
}

impl Eq for TransactionRecord {}

impl TransactionRecord {
    /// A full record with no signature payload (valid when no input expects
    /// one).
    pub fn new(prefix: TransactionPrefix) -> Self {
        debug_assert!(prefix.version_permits_type());
        Self {
            prefix,
            ..Self::default()
        }
    }

    /// A version-1 record with classic signature groups.
    pub fn with_signatures(prefix: TransactionPrefix, signatures: Vec<Vec<Signature>>) -> Self {
        debug_assert_eq!(prefix.version, TxVersion::V1);
        Self {
            prefix,
            signatures,
            ..Self::default()
        }
    }

    /// A version-2+ record with an embedded ring-CT structure.
    pub fn with_ringct(prefix: TransactionPrefix, ringct: RingCtSignature) -> Self {
        debug_assert!(prefix.version >= TxVersion::V2);
        Self {
            prefix,
            ringct: Some(ringct),
            ..Self::default()
        }
    }

    pub fn prefix(&self) -> &TransactionPrefix {
        &self.prefix
    }

    /// Mutable prefix access; drops the cached hash and blob size.
    pub fn prefix_mut(&mut self) -> &mut TransactionPrefix {
        self.hash.invalidate();
        self.blob_size.invalidate();
        &mut self.prefix
    }

    pub fn signatures(&self) -> &[Vec<Signature>] {
        &self.signatures
    }

    pub fn set_signatures(&mut self, signatures: Vec<Vec<Signature>>) {
        self.hash.invalidate();
        self.blob_size.invalidate();
        self.signatures = signatures;
    }

    pub fn ringct(&self) -> Option<&RingCtSignature> {
        self.ringct.as_ref()
    }

    pub fn set_ringct(&mut self, ringct: Option<RingCtSignature>) {
        self.hash.invalidate();
        self.blob_size.invalidate();
        self.ringct = ringct;
    }

    /// Whether proof data has been stripped. A pruned record never validates.
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    /// Strip signatures and prunable proof data.
    pub fn prune(&mut self) {
        self.hash.invalidate();
        self.blob_size.invalidate();
        self.signatures.clear();
        if let Some(ringct) = self.ringct.as_mut() {
            ringct.prunable.clear();
        }
        self.pruned = true;
    }

    /// Exactly one `Generation` input and nothing else.
    pub fn is_coinbase(&self) -> bool {
        matches!(self.prefix.inputs.as_slice(), [TxInput::Generation { .. }])
    }

    /// Content hash, computed on first request and cached until mutation.
    pub fn hash(&mut self) -> Hash {
        let encoded = self.encode();
        self.hash.get_or_compute(|| keccak256(&encoded))
    }

    /// Canonical encoding length, cached like the hash.
    pub fn blob_size(&mut self) -> u64 {
        let encoded = self.encode();
        self.blob_size.get_or_compute(|| encoded.len() as u64)
    }

    /// The cached hash, if one has been computed since the last mutation.
    pub fn cached_hash(&self) -> Option<Hash> {
        self.hash.get()
    }

    /// Canonical byte-exact encoding.
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.prefix.version_permits_type());
        let mut w = ByteWriter::with_capacity(128);
        encode_prefix(&mut w, &self.prefix);
        match self.prefix.version {
            TxVersion::V1 => {
                for group in &self.signatures {
                    for signature in group {
                        w.write_bytes(signature);
                    }
                }
            }
            _ => {
                if !self.prefix.inputs.is_empty() {
                    let null_sig = RingCtSignature::null();
                    let ringct = self.ringct.as_ref().unwrap_or(&null_sig);
                    w.write_u8(ringct.scheme.to_wire());
                    w.write_blob(&ringct.base);
                    if !self.pruned {
                        w.write_blob(&ringct.prunable);
                    }
                }
            }
        }
        w.into_bytes()
    }

    /// Decode a full record. Trailing bytes are an error.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        let mut r = ByteReader::new(bytes);
        let record = Self::decode_body(&mut r, false)?;
        r.expect_end()?;
        Ok(record)
    }

    /// Decode a pruned record: signatures and prunable proof data are absent
    /// on the wire, and the result is always flagged pruned.
    pub fn decode_pruned(bytes: &[u8]) -> DecodeResult<Self> {
        let mut r = ByteReader::new(bytes);
        let record = Self::decode_body(&mut r, true)?;
        r.expect_end()?;
        Ok(record)
    }

    /// Decode a record embedded mid-stream (the coinbase inside a block),
    /// leaving the reader positioned after it.
    pub(crate) fn decode_nested(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        Self::decode_body(r, false)
    }

    fn decode_body(r: &mut ByteReader<'_>, pruned: bool) -> DecodeResult<Self> {
        let prefix = decode_prefix(r)?;
        let mut signatures = Vec::new();
        let mut ringct = None;

        match prefix.version {
            TxVersion::V1 => {
                if !pruned {
                    signatures = decode_signature_groups(r, &prefix.inputs)?;
                }
            }
            _ => {
                if !prefix.inputs.is_empty() {
                    let scheme = RctScheme::from_wire(r.read_u8()?)?;
                    let base = r.read_blob()?;
                    let prunable = if pruned { Vec::new() } else { r.read_blob()? };
                    ringct = Some(RingCtSignature {
                        scheme,
                        base,
                        prunable,
                    });
                }
            }
        }

        Ok(Self {
            prefix,
            signatures,
            ringct,
            pruned,
            hash: Cached::empty(),
            blob_size: Cached::empty(),
        })
    }
}

fn encode_prefix(w: &mut ByteWriter, prefix: &TransactionPrefix) {
    w.write_varint(prefix.version.to_wire());
    if prefix.version >= TxVersion::V3 {
        w.write_varint(prefix.per_output_unlock_times.len() as u64);
        for unlock_time in &prefix.per_output_unlock_times {
            w.write_varint(*unlock_time);
        }
        if prefix.version == TxVersion::V3 {
            w.write_bool(prefix.tx_type == TxType::Deregister);
        } else {
            w.write_u8(prefix.tx_type.to_wire());
        }
    }
    w.write_varint(prefix.unlock_time);

    w.write_varint(prefix.inputs.len() as u64);
    for input in &prefix.inputs {
        encode_input(w, input);
    }
    w.write_varint(prefix.outputs.len() as u64);
    for output in &prefix.outputs {
        encode_output(w, output);
    }
    w.write_blob(&prefix.extra);
}

fn decode_prefix(r: &mut ByteReader<'_>) -> DecodeResult<TransactionPrefix> {
    let version = TxVersion::from_wire(r.read_varint()?)?;

    let mut per_output_unlock_times = Vec::new();
    let mut tx_type = TxType::Standard;
    if version >= TxVersion::V3 {
        let count = r.read_count()?;
        per_output_unlock_times.reserve(count);
        for _ in 0..count {
            per_output_unlock_times.push(r.read_varint()?);
        }
        // The version-3 legacy flag occupies the same wire slot as the
        // version-4 type tag.
        if version == TxVersion::V3 {
            if r.read_bool()? {
                tx_type = TxType::Deregister;
            }
        } else {
            tx_type = TxType::from_wire(r.read_u8()?)?;
        }
    }
    let unlock_time = r.read_varint()?;

    let input_count = r.read_count()?;
    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        inputs.push(decode_input(r)?);
    }

    let output_count = r.read_count()?;
    let mut outputs = Vec::with_capacity(output_count);
    for _ in 0..output_count {
        outputs.push(decode_output(r)?);
    }

    if version >= TxVersion::V3 && outputs.len() != per_output_unlock_times.len() {
        return Err(DecodeError::FieldCountMismatch {
            outputs: outputs.len(),
            unlock_times: per_output_unlock_times.len(),
        });
    }

    let extra = r.read_blob()?;

    Ok(TransactionPrefix {
        version,
        unlock_time,
        per_output_unlock_times,
        inputs,
        outputs,
        extra,
        tx_type,
    })
}

fn encode_input(w: &mut ByteWriter, input: &TxInput) {
    match input {
        TxInput::Generation { height } => {
            w.write_u8(TAG_TXIN_GENERATION);
            w.write_varint(*height);
        }
        TxInput::ToScript {
            prev,
            prevout,
            sigset,
        } => {
            w.write_u8(TAG_TXIN_TO_SCRIPT);
            w.write_bytes(prev);
            w.write_varint(*prevout);
            w.write_blob(sigset);
        }
        TxInput::ToScriptHash {
            prev,
            prevout,
            script,
        } => {
            w.write_u8(TAG_TXIN_TO_SCRIPT_HASH);
            w.write_bytes(prev);
            w.write_varint(*prevout);
            w.write_blob(script);
        }
        TxInput::ToKey {
            amount,
            key_offsets,
            key_image,
        } => {
            w.write_u8(TAG_TXIN_TO_KEY);
            w.write_varint(*amount);
            w.write_varint(key_offsets.len() as u64);
            for offset in key_offsets {
                w.write_varint(*offset);
            }
            w.write_bytes(key_image.as_bytes());
        }
    }
}

fn decode_input(r: &mut ByteReader<'_>) -> DecodeResult<TxInput> {
    let tag = r.read_u8()?;
    match tag {
        TAG_TXIN_GENERATION => Ok(TxInput::Generation {
            height: r.read_varint()?,
        }),
        TAG_TXIN_TO_SCRIPT => Ok(TxInput::ToScript {
            prev: r.read_array()?,
            prevout: r.read_varint()?,
            sigset: r.read_blob()?,
        }),
        TAG_TXIN_TO_SCRIPT_HASH => Ok(TxInput::ToScriptHash {
            prev: r.read_array()?,
            prevout: r.read_varint()?,
            script: r.read_blob()?,
        }),
        TAG_TXIN_TO_KEY => {
            let amount = r.read_varint()?;
            let count = r.read_count()?;
            let mut key_offsets = Vec::with_capacity(count);
            for _ in 0..count {
                key_offsets.push(r.read_varint()?);
            }
            let key_image = KeyImage::new(r.read_array()?);
            Ok(TxInput::ToKey {
                amount,
                key_offsets,
                key_image,
            })
        }
        _ => Err(DecodeError::UnknownVariant {
            what: "transaction input",
            tag,
        }),
    }
}

fn encode_output(w: &mut ByteWriter, output: &TxOutput) {
    w.write_varint(output.amount);
    match &output.target {
        TxOutTarget::ToScript { keys, script } => {
            w.write_u8(TAG_TXOUT_TO_SCRIPT);
            w.write_varint(keys.len() as u64);
            for key in keys {
                w.write_bytes(key);
            }
            w.write_blob(script);
        }
        TxOutTarget::ToScriptHash { hash } => {
            w.write_u8(TAG_TXOUT_TO_SCRIPT_HASH);
            w.write_bytes(hash);
        }
        TxOutTarget::ToKey { key } => {
            w.write_u8(TAG_TXOUT_TO_KEY);
            w.write_bytes(key);
        }
    }
}

fn decode_output(r: &mut ByteReader<'_>) -> DecodeResult<TxOutput> {
    let amount = r.read_varint()?;
    let tag = r.read_u8()?;
    let target = match tag {
        TAG_TXOUT_TO_SCRIPT => {
            let count = r.read_count()?;
            let mut keys = Vec::with_capacity(count);
            for _ in 0..count {
                keys.push(r.read_array()?);
            }
            TxOutTarget::ToScript {
                keys,
                script: r.read_blob()?,
            }
        }
        TAG_TXOUT_TO_SCRIPT_HASH => TxOutTarget::ToScriptHash {
            hash: r.read_array()?,
        },
        TAG_TXOUT_TO_KEY => TxOutTarget::ToKey {
            key: r.read_array()?,
        },
        _ => {
            return Err(DecodeError::UnknownVariant {
                what: "transaction output target",
                tag,
            })
        }
    };
    Ok(TxOutput { amount, target })
}

/// Version-1 signature groups: one group per input, group size equal to the
/// input's arity. Absent groups are accepted only when every arity is zero
/// ("signatures not expected").
fn decode_signature_groups(
    r: &mut ByteReader<'_>,
    inputs: &[TxInput],
) -> DecodeResult<Vec<Vec<Signature>>> {
    let arities: Vec<usize> = inputs.iter().map(TxInput::signature_arity).collect();
    if arities.iter().all(|arity| *arity == 0) {
        return Ok(Vec::new());
    }
    if r.is_empty() {
        let (input, expected) = arities
            .iter()
            .copied()
            .enumerate()
            .find(|(_, arity)| *arity != 0)
            .unwrap_or((0, 0));
        return Err(DecodeError::SignatureCountMismatch {
            input,
            expected,
            found: 0,
        });
    }

    let mut groups = Vec::with_capacity(inputs.len());
    for arity in arities {
        let mut group = Vec::with_capacity(arity);
        for _ in 0..arity {
            group.push(r.read_array::<64>()?);
        }
        groups.push(group);
    }
    Ok(groups)
}

/// Decode many independent records in parallel.
///
/// Codec operations are pure, so this is safe for e.g. validating a pool of
/// candidate transactions before block assembly.
pub fn decode_batch<B: AsRef<[u8]> + Sync>(blobs: &[B]) -> Vec<DecodeResult<TransactionRecord>> {
    blobs
        .par_iter()
        .map(|blob| TransactionRecord::decode(blob.as_ref()))
        .collect()
}
