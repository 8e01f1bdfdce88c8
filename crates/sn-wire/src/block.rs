//! Block records.
//!
//! A block is a header, exactly one coinbase transaction, and an ordered
//! list of transaction-hash references. Identity is content-addressed:
//! Keccak-256 over the canonical encoding, cached until mutation.

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{DecodeError, DecodeResult};
use crate::transaction::TransactionRecord;
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{Cached, Hash};

/// Block header fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub prev_id: Hash,
    pub nonce: u32,
}

/// A block: header + coinbase + transaction references.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BlockRecord {
    header: BlockHeader,
    coinbase: TransactionRecord,
    tx_hashes: Vec<Hash>,
    #[serde(skip)]
    hash: Cached<Hash>,
}

impl PartialEq for BlockRecord {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.coinbase == other.coinbase
            && self.tx_hashes == other.tx_hashes
    }
}

impl Eq for BlockRecord {}

impl BlockRecord {
    pub fn new(header: BlockHeader, coinbase: TransactionRecord, tx_hashes: Vec<Hash>) -> Self {
        Self {
            header,
            coinbase,
            tx_hashes,
            hash: Cached::empty(),
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Mutable header access; drops the cached block hash.
    pub fn header_mut(&mut self) -> &mut BlockHeader {
        self.hash.invalidate();
        &mut self.header
    }

    pub fn coinbase(&self) -> &TransactionRecord {
        &self.coinbase
    }

    /// Mutable coinbase access; drops the cached block hash.
    pub fn coinbase_mut(&mut self) -> &mut TransactionRecord {
        self.hash.invalidate();
        &mut self.coinbase
    }

    pub fn tx_hashes(&self) -> &[Hash] {
        &self.tx_hashes
    }

    pub fn push_tx_hash(&mut self, hash: Hash) {
        self.hash.invalidate();
        self.tx_hashes.push(hash);
    }

    /// Content hash over the serialized header, coinbase, and hash list.
    pub fn hash(&mut self) -> Hash {
        let encoded = self.encode();
        self.hash.get_or_compute(|| keccak256(&encoded))
    }

    /// The cached hash, if one has been computed since the last mutation.
    pub fn cached_hash(&self) -> Option<Hash> {
        self.hash.get()
    }

    /// Canonical byte-exact encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(256);
        w.write_varint(u64::from(self.header.major_version));
        w.write_varint(u64::from(self.header.minor_version));
        w.write_varint(self.header.timestamp);
        w.write_bytes(&self.header.prev_id);
        w.write_u32_le(self.header.nonce);
        w.write_bytes(&self.coinbase.encode());
        w.write_varint(self.tx_hashes.len() as u64);
        for hash in &self.tx_hashes {
            w.write_bytes(hash);
        }
        w.into_bytes()
    }

    /// Decode a block. Trailing bytes are an error.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        let mut r = ByteReader::new(bytes);

        let major_version = decode_version_byte(r.read_varint()?, "major_version")?;
        let minor_version = decode_version_byte(r.read_varint()?, "minor_version")?;
        let timestamp = r.read_varint()?;
        let prev_id = r.read_array()?;
        let nonce = r.read_u32_le()?;

        let header = BlockHeader {
            major_version,
            minor_version,
            timestamp,
            prev_id,
            nonce,
        };

        let coinbase = TransactionRecord::decode_nested(&mut r)?;

        let count = r.read_count()?;
        let mut tx_hashes = Vec::with_capacity(count);
        for _ in 0..count {
            tx_hashes.push(r.read_array()?);
        }

        r.expect_end()?;
        Ok(Self {
            header,
            coinbase,
            tx_hashes,
            hash: Cached::empty(),
        })
    }
}

fn decode_version_byte(value: u64, what: &'static str) -> DecodeResult<u8> {
    u8::try_from(value).map_err(|_| DecodeError::ValueOutOfRange { what, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{
        RingCtSignature, TransactionPrefix, TxInput, TxOutTarget, TxOutput, TxVersion,
    };

    fn coinbase(height: u64) -> TransactionRecord {
        let prefix = TransactionPrefix {
            version: TxVersion::V2,
            inputs: vec![TxInput::Generation { height }],
            outputs: vec![TxOutput {
                amount: 1_000,
                target: TxOutTarget::ToKey { key: [5u8; 32] },
            }],
            ..Default::default()
        };
        TransactionRecord::with_ringct(prefix, RingCtSignature::null())
    }

    fn block() -> BlockRecord {
        let header = BlockHeader {
            major_version: 9,
            minor_version: 9,
            timestamp: 1_700_000_000,
            prev_id: [3u8; 32],
            nonce: 0xdead_beef,
        };
        BlockRecord::new(header, coinbase(10), vec![[1u8; 32], [2u8; 32]])
    }

    #[test]
    fn test_round_trip() {
        let original = block();
        let decoded = BlockRecord::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.cached_hash(), None);
    }

    #[test]
    fn test_hash_is_content_addressed() {
        let mut a = block();
        let mut b = block();
        assert_eq!(a.hash(), b.hash());

        b.header_mut().nonce += 1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_mutation_invalidates_hash() {
        let mut b = block();
        let before = b.hash();

        b.push_tx_hash([7u8; 32]);
        assert_eq!(b.cached_hash(), None);
        assert_ne!(b.hash(), before);

        let before = b.hash();
        b.coinbase_mut().prefix_mut().unlock_time = 5;
        assert_ne!(b.hash(), before);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = block().encode();
        bytes.push(0);
        assert!(BlockRecord::decode(&bytes).is_err());
    }
}
