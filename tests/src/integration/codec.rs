//! Archive equivalence: the binary wire format and the JSON debug archive
//! must round-trip to the same logical record.

#![cfg(test)]

use shared_types::KeyImage;
use sn_wire::{
    decode_batch, BlockHeader, BlockRecord, RctScheme, RingCtSignature, TransactionPrefix,
    TransactionRecord, TxInput, TxOutTarget, TxOutput, TxType, TxVersion,
};

fn sample_record(version: TxVersion) -> TransactionRecord {
    let outputs = vec![
        TxOutput {
            amount: 700,
            target: TxOutTarget::ToKey { key: [1u8; 32] },
        },
        TxOutput {
            amount: 300,
            target: TxOutTarget::ToScriptHash { hash: [2u8; 32] },
        },
    ];
    let per_output_unlock_times = if version >= TxVersion::V3 {
        vec![60, 0]
    } else {
        Vec::new()
    };
    let prefix = TransactionPrefix {
        version,
        unlock_time: 10,
        per_output_unlock_times,
        inputs: vec![TxInput::ToKey {
            amount: 1_000,
            key_offsets: vec![11, 4, 7],
            key_image: KeyImage::new([3u8; 32]),
        }],
        outputs,
        extra: vec![0x01; 33],
        tx_type: TxType::Standard,
    };

    match version {
        TxVersion::V1 => TransactionRecord::with_signatures(prefix, vec![vec![[6u8; 64]; 3]]),
        _ => TransactionRecord::with_ringct(
            prefix,
            RingCtSignature {
                scheme: RctScheme::Bulletproof,
                base: vec![0xcc; 24],
                prunable: vec![0xdd; 48],
            },
        ),
    }
}

#[test]
fn test_json_and_binary_agree_for_every_version() {
    for version in [TxVersion::V1, TxVersion::V2, TxVersion::V3, TxVersion::V4] {
        let record = sample_record(version);

        let from_binary = TransactionRecord::decode(&record.encode()).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let from_json: TransactionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(from_binary, record);
        assert_eq!(from_json, record);
        assert_eq!(from_json, from_binary);
        // The JSON archive re-encodes to the same canonical bytes.
        assert_eq!(from_json.encode(), record.encode());
    }
}

#[test]
fn test_json_uses_named_variant_tags() {
    let record = sample_record(TxVersion::V4);
    let json = serde_json::to_string(&record).unwrap();

    assert!(json.contains("ToKey"));
    assert!(json.contains("Bulletproof"));
    assert!(json.contains("Standard"));
}

#[test]
fn test_block_archives_agree() {
    let coinbase = TransactionRecord::with_ringct(
        TransactionPrefix {
            version: TxVersion::V2,
            inputs: vec![TxInput::Generation { height: 77 }],
            outputs: vec![TxOutput {
                amount: 5_000,
                target: TxOutTarget::ToKey { key: [9u8; 32] },
            }],
            ..Default::default()
        },
        RingCtSignature::null(),
    );
    let block = BlockRecord::new(
        BlockHeader {
            major_version: 9,
            minor_version: 10,
            timestamp: 1_700_000_123,
            prev_id: [7u8; 32],
            nonce: 42,
        },
        coinbase,
        vec![[1u8; 32], [2u8; 32], [3u8; 32]],
    );

    let from_binary = BlockRecord::decode(&block.encode()).unwrap();
    let json = serde_json::to_string(&block).unwrap();
    let from_json: BlockRecord = serde_json::from_str(&json).unwrap();

    assert_eq!(from_binary, block);
    assert_eq!(from_json, block);
    assert_eq!(from_json.encode(), block.encode());
}

#[test]
fn test_batch_decode_a_mempool() {
    let blobs: Vec<Vec<u8>> = (0..64u8)
        .map(|i| {
            let mut record = sample_record(TxVersion::V4);
            record.prefix_mut().unlock_time = u64::from(i);
            record.encode()
        })
        .collect();

    let decoded = decode_batch(&blobs);
    assert_eq!(decoded.len(), 64);
    for (i, result) in decoded.iter().enumerate() {
        let record = result.as_ref().unwrap();
        assert_eq!(record.prefix().unlock_time, i as u64);
    }
}

#[test]
fn test_pruned_blob_is_rejected_by_full_decode() {
    let mut record = sample_record(TxVersion::V4);
    record.prune();
    let blob = record.encode();

    assert!(TransactionRecord::decode(&blob).is_err());
    let reloaded = TransactionRecord::decode_pruned(&blob).unwrap();
    assert!(reloaded.is_pruned());
}
