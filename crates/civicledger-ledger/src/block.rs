use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use civicledger_types::{CivicError, Result};

use crate::canonical;

/// Action label carried by the genesis block.
pub const GENESIS_ACTION: &str = "GENESIS";

/// Sentinel predecessor digest for the genesis block (64 zero nibbles, the
/// width of a hex-encoded SHA-256 digest).
pub const GENESIS_PREVIOUS_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// One immutable, digest-bearing record in the audit chain.
///
/// The digest is computed exactly once, at construction, over the canonical
/// encoding of every other field. It is never recomputed in place;
/// [`Block::recompute_digest`] exists for verification only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub payload: Value,
    pub previous_digest: String,
    pub digest: String,
}

impl Block {
    /// Construct a block and seal it with its digest.
    ///
    /// Fails if the action label is empty or the payload cannot be
    /// canonically serialized; a block is never constructed from a partial
    /// or non-deterministic digest input.
    pub fn new(index: u64, action: &str, payload: Value, previous_digest: String) -> Result<Self> {
        if action.trim().is_empty() {
            return Err(CivicError::EmptyAction);
        }
        let mut block = Self {
            index,
            timestamp: Utc::now(),
            action: action.to_string(),
            payload,
            previous_digest,
            digest: String::new(),
        };
        block.digest = block.recompute_digest()?;
        Ok(block)
    }

    /// The fixed first block of every chain: index 0, empty payload,
    /// sentinel predecessor digest.
    pub fn genesis() -> Self {
        Self::new(
            0,
            GENESIS_ACTION,
            Value::Object(serde_json::Map::new()),
            GENESIS_PREVIOUS_DIGEST.to_string(),
        )
        .expect("genesis block has a fixed, serializable shape")
    }

    /// What the digest should be, as a pure function of the stored fields.
    ///
    /// Used by verification to detect tampering; never overwrites the stored
    /// digest.
    pub fn recompute_digest(&self) -> Result<String> {
        let payload = canonical::to_canonical_json(&self.payload)?;
        let input = format!(
            "{}\n{}\n{}\n{}\n{}",
            self.index,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.action,
            payload,
            self.previous_digest,
        );
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}
