//! Tx-extra sub-record stream.
//!
//! The `extra` field of a transaction prefix is an opaque byte sequence to
//! the outer codec; inside it is a tagged stream of sub-records carrying the
//! transaction public key, arbitrary nonces, and the service-node
//! registration and deregistration payloads. Same varint/discriminant
//! discipline as the outer format: unrecognized tags fail parsing.

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{DecodeError, DecodeResult};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{keccak256, CryptoProvider};
use shared_types::{Address, Hash, NodePublicKey, Signature};

pub const EXTRA_TAG_PADDING: u8 = 0x00;
pub const EXTRA_TAG_TX_PUBKEY: u8 = 0x01;
pub const EXTRA_TAG_NONCE: u8 = 0x02;
pub const EXTRA_TAG_REGISTRATION: u8 = 0x70;
pub const EXTRA_TAG_DEREGISTER: u8 = 0x71;

/// One reserved stake slot in a registration payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorSlot {
    pub address: Address,
    /// Share of the total stake, out of the full-portion denominator.
    pub portion: u64,
}

/// Service-node registration payload (tag 0x70).
///
/// The operator signs the Keccak-256 of the preceding fields with the node
/// key; validation recomputes that hash.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub node_key: NodePublicKey,
    pub contributors: Vec<ContributorSlot>,
    pub expiration: u64,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl RegistrationPayload {
    /// Canonical hash the operator signature commits to.
    pub fn signing_hash(&self) -> Hash {
        let mut w = ByteWriter::new();
        w.write_bytes(self.node_key.as_bytes());
        w.write_varint(self.contributors.len() as u64);
        for slot in &self.contributors {
            w.write_bytes(slot.address.as_bytes());
            w.write_varint(slot.portion);
        }
        w.write_varint(self.expiration);
        keccak256(&w.into_bytes())
    }

    /// Verify the operator signature against the node key.
    pub fn verify<P: CryptoProvider>(&self, provider: &P) -> bool {
        provider.verify(&self.signing_hash(), &self.node_key, &self.signature)
    }
}

/// One vote inside a deregistration payload.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadVote {
    /// Position of the voter in the committee's `voters` list.
    pub voter_index: u32,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// Service-node deregistration payload (tag 0x71).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterPayload {
    /// Height whose quorum voted.
    pub target_height: u64,
    /// Position of the target in that quorum's `to_test` list.
    pub target_index: u32,
    pub votes: Vec<PayloadVote>,
}

/// A parsed tx-extra sub-record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraField {
    /// Zero padding of the given length.
    Padding { length: u64 },
    TxPublicKey { key: [u8; 32] },
    Nonce { data: Vec<u8> },
    Registration(RegistrationPayload),
    Deregister(DeregisterPayload),
}

/// Serialize sub-records into an `extra` byte sequence.
pub fn build_extra(fields: &[ExtraField]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    for field in fields {
        match field {
            ExtraField::Padding { length } => {
                w.write_u8(EXTRA_TAG_PADDING);
                w.write_varint(*length);
                for _ in 0..*length {
                    w.write_u8(0);
                }
            }
            ExtraField::TxPublicKey { key } => {
                w.write_u8(EXTRA_TAG_TX_PUBKEY);
                w.write_bytes(key);
            }
            ExtraField::Nonce { data } => {
                w.write_u8(EXTRA_TAG_NONCE);
                w.write_blob(data);
            }
            ExtraField::Registration(payload) => {
                w.write_u8(EXTRA_TAG_REGISTRATION);
                w.write_bytes(payload.node_key.as_bytes());
                w.write_varint(payload.contributors.len() as u64);
                for slot in &payload.contributors {
                    w.write_bytes(slot.address.as_bytes());
                    w.write_varint(slot.portion);
                }
                w.write_varint(payload.expiration);
                w.write_bytes(&payload.signature);
            }
            ExtraField::Deregister(payload) => {
                w.write_u8(EXTRA_TAG_DEREGISTER);
                w.write_varint(payload.target_height);
                w.write_varint(u64::from(payload.target_index));
                w.write_varint(payload.votes.len() as u64);
                for vote in &payload.votes {
                    w.write_varint(u64::from(vote.voter_index));
                    w.write_bytes(&vote.signature);
                }
            }
        }
    }
    w.into_bytes()
}

/// Parse an `extra` byte sequence into sub-records.
pub fn parse_extra(extra: &[u8]) -> DecodeResult<Vec<ExtraField>> {
    let mut r = ByteReader::new(extra);
    let mut fields = Vec::new();
    while !r.is_empty() {
        fields.push(parse_field(&mut r)?);
    }
    Ok(fields)
}

fn parse_field(r: &mut ByteReader<'_>) -> DecodeResult<ExtraField> {
    let tag = r.read_u8()?;
    match tag {
        EXTRA_TAG_PADDING => {
            let length = r.read_count()? as u64;
            for _ in 0..length {
                let byte = r.read_u8()?;
                if byte != 0 {
                    return Err(DecodeError::InvalidFlag { value: byte });
                }
            }
            Ok(ExtraField::Padding { length })
        }
        EXTRA_TAG_TX_PUBKEY => Ok(ExtraField::TxPublicKey {
            key: r.read_array()?,
        }),
        EXTRA_TAG_NONCE => Ok(ExtraField::Nonce {
            data: r.read_blob()?,
        }),
        EXTRA_TAG_REGISTRATION => {
            let node_key = NodePublicKey::new(r.read_array()?);
            let count = r.read_count()?;
            let mut contributors = Vec::with_capacity(count);
            for _ in 0..count {
                contributors.push(ContributorSlot {
                    address: Address::new(r.read_array()?),
                    portion: r.read_varint()?,
                });
            }
            let expiration = r.read_varint()?;
            let signature = r.read_array::<64>()?;
            Ok(ExtraField::Registration(RegistrationPayload {
                node_key,
                contributors,
                expiration,
                signature,
            }))
        }
        EXTRA_TAG_DEREGISTER => {
            let target_height = r.read_varint()?;
            let target_index = decode_index(r.read_varint()?)?;
            let count = r.read_count()?;
            let mut votes = Vec::with_capacity(count);
            for _ in 0..count {
                let voter_index = decode_index(r.read_varint()?)?;
                let signature = r.read_array::<64>()?;
                votes.push(PayloadVote {
                    voter_index,
                    signature,
                });
            }
            Ok(ExtraField::Deregister(DeregisterPayload {
                target_height,
                target_index,
                votes,
            }))
        }
        _ => Err(DecodeError::UnknownVariant {
            what: "tx-extra field",
            tag,
        }),
    }
}

fn decode_index(value: u64) -> DecodeResult<u32> {
    u32::try_from(value).map_err(|_| DecodeError::LengthOutOfBounds {
        declared: value,
        remaining: u32::MAX as usize,
    })
}

/// First registration payload in `extra`, if any.
pub fn find_registration(extra: &[u8]) -> DecodeResult<Option<RegistrationPayload>> {
    Ok(parse_extra(extra)?.into_iter().find_map(|field| match field {
        ExtraField::Registration(payload) => Some(payload),
        _ => None,
    }))
}

/// First deregistration payload in `extra`, if any.
pub fn find_deregister(extra: &[u8]) -> DecodeResult<Option<DeregisterPayload>> {
    Ok(parse_extra(extra)?.into_iter().find_map(|field| match field {
        ExtraField::Deregister(payload) => Some(payload),
        _ => None,
    }))
}
