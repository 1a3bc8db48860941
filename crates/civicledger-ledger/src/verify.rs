use serde::{Deserialize, Serialize};

use crate::block::{Block, GENESIS_PREVIOUS_DIGEST};

/// Outcome of a full chain verification.
///
/// Not an error: a broken chain is a reportable integrity finding surfaced
/// to the administrative reader, and the ledger never attempts repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub valid: bool,
    /// Position of the first block failing verification, when invalid.
    pub first_invalid_index: Option<u64>,
}

impl IntegrityReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            first_invalid_index: None,
        }
    }

    pub fn broken_at(position: u64) -> Self {
        Self {
            valid: false,
            first_invalid_index: Some(position),
        }
    }
}

/// Walk a chain from position 0 and verify every block.
///
/// Each block must sit at the position matching its stored index, reference
/// its actual predecessor's digest (the sentinel for genesis), and carry a
/// digest equal to the recomputation over its stored fields. The first block
/// failing any check localizes where tampering became detectable; deleting
/// or inserting a block shifts every later link, so the break is reported at
/// the point of structural disruption.
///
/// Operates on any slice of blocks, so an exported snapshot verifies exactly
/// like the live chain. A valid chain always contains at least the genesis
/// block; an empty slice is reported as broken at position 0.
pub fn verify_blocks(blocks: &[Block]) -> IntegrityReport {
    if blocks.is_empty() {
        return IntegrityReport::broken_at(0);
    }
    for (position, block) in blocks.iter().enumerate() {
        let position = position as u64;
        if block.index != position {
            return IntegrityReport::broken_at(position);
        }

        let expected_previous = if position == 0 {
            GENESIS_PREVIOUS_DIGEST
        } else {
            blocks[position as usize - 1].digest.as_str()
        };
        if block.previous_digest != expected_previous {
            return IntegrityReport::broken_at(position);
        }

        // A payload that no longer canonicalizes cannot match its digest.
        match block.recompute_digest() {
            Ok(digest) if digest == block.digest => {}
            _ => return IntegrityReport::broken_at(position),
        }
    }
    IntegrityReport::valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain_of(n: usize) -> Vec<Block> {
        let mut blocks = vec![Block::genesis()];
        for i in 1..=n {
            let prev = blocks.last().unwrap();
            blocks.push(
                Block::new(prev.index + 1, "EVENT", json!({"seq": i}), prev.digest.clone())
                    .unwrap(),
            );
        }
        blocks
    }

    #[test]
    fn test_fresh_chain_verifies() {
        for n in [0, 1, 5, 32] {
            assert_eq!(verify_blocks(&chain_of(n)), IntegrityReport::valid());
        }
    }

    #[test]
    fn test_empty_slice_is_broken() {
        assert_eq!(verify_blocks(&[]), IntegrityReport::broken_at(0));
    }

    #[test]
    fn test_tampered_payload_localized() {
        let mut blocks = chain_of(5);
        blocks[3].payload = json!({"seq": 999});
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(3));
    }

    #[test]
    fn test_tampered_action_localized() {
        let mut blocks = chain_of(5);
        blocks[2].action = "FORGED".into();
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(2));
    }

    #[test]
    fn test_tampered_timestamp_localized() {
        let mut blocks = chain_of(5);
        blocks[4].timestamp += chrono::Duration::seconds(1);
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(4));
    }

    #[test]
    fn test_timestamp_shifted_within_one_millisecond_localized() {
        let mut blocks = chain_of(5);
        blocks[2].timestamp += chrono::Duration::microseconds(1);
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(2));
    }

    #[test]
    fn test_removed_block_breaks_at_the_gap() {
        let mut blocks = chain_of(5);
        blocks.remove(2);
        // The block previously at position 3 now sits at position 2 with a
        // stale index and predecessor reference.
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(2));
    }

    #[test]
    fn test_swapped_blocks_break_at_first_displacement() {
        let mut blocks = chain_of(5);
        blocks.swap(1, 2);
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(1));
    }

    #[test]
    fn test_genesis_sentinel_enforced() {
        let mut blocks = chain_of(2);
        blocks[0].previous_digest = "ab".repeat(32);
        assert_eq!(verify_blocks(&blocks), IntegrityReport::broken_at(0));
    }
}
