use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use civicledger_types::Result;

use crate::block::Block;
use crate::traits::AuditLog;
use crate::verify::{self, IntegrityReport};

/// In-memory audit ledger: an append-only chain held for the process
/// lifetime.
///
/// The chain always contains at least the genesis block; reaching an empty
/// chain is an internal-consistency violation and panics. `append` holds the
/// write lock across tail read, block construction, and push, so concurrent
/// callers can never mint two blocks claiming the same predecessor. Readers
/// take the read lock and therefore always observe a consistent
/// point-in-time snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    chain: Arc<RwLock<Vec<Block>>>,
}

impl InMemoryLedger {
    /// Create a ledger holding exactly the genesis block.
    pub fn new() -> Self {
        Self {
            chain: Arc::new(RwLock::new(vec![Block::genesis()])),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryLedger {
    async fn append(&self, action: &str, payload: Value) -> Result<Block> {
        let mut chain = self.chain.write().await;
        let previous = chain
            .last()
            .expect("audit chain always contains the genesis block");
        let block = Block::new(
            previous.index + 1,
            action,
            payload,
            previous.digest.clone(),
        )?;
        chain.push(block.clone());
        Ok(block)
    }

    async fn tail(&self) -> Block {
        self.chain
            .read()
            .await
            .last()
            .expect("audit chain always contains the genesis block")
            .clone()
    }

    async fn export(&self) -> Vec<Block> {
        self.chain.read().await.clone()
    }

    async fn verify(&self) -> IntegrityReport {
        let chain = self.chain.read().await;
        verify::verify_blocks(&chain)
    }

    async fn len(&self) -> usize {
        self.chain.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{GENESIS_ACTION, GENESIS_PREVIOUS_DIGEST};
    use civicledger_types::CivicError;
    use serde_json::json;

    #[tokio::test]
    async fn test_new_ledger_holds_genesis() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.len().await, 1);

        let tail = ledger.tail().await;
        assert_eq!(tail.index, 0);
        assert_eq!(tail.action, GENESIS_ACTION);
        assert_eq!(tail.previous_digest, GENESIS_PREVIOUS_DIGEST);
        assert!(ledger.verify().await.valid);
    }

    #[tokio::test]
    async fn test_append_links_to_tail() {
        let ledger = InMemoryLedger::new();
        let genesis = ledger.tail().await;

        let block = ledger
            .append("STATUS_CHANGED", json!({"from": "submitted", "to": "approved"}))
            .await
            .unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_digest, genesis.digest);
        assert_eq!(ledger.tail().await, block);
    }

    #[tokio::test]
    async fn test_indices_are_gapless() {
        let ledger = InMemoryLedger::new();
        for i in 0..10 {
            ledger.append("EVENT", json!({"seq": i})).await.unwrap();
        }

        let chain = ledger.export().await;
        assert_eq!(chain.len(), 11);
        for (position, block) in chain.iter().enumerate() {
            assert_eq!(block.index, position as u64);
        }
        assert!(ledger.verify().await.valid);
    }

    #[tokio::test]
    async fn test_rejected_append_leaves_chain_untouched() {
        let ledger = InMemoryLedger::new();
        let err = ledger.append("", json!({})).await.unwrap_err();
        assert!(matches!(err, CivicError::EmptyAction));
        assert_eq!(ledger.len().await, 1);
        assert!(ledger.verify().await.valid);
    }

    #[tokio::test]
    async fn test_export_is_a_snapshot() {
        let ledger = InMemoryLedger::new();
        ledger.append("EVENT", json!({})).await.unwrap();

        let mut exported = ledger.export().await;
        exported[1].payload = json!({"forged": true});

        // Tampering with the snapshot must not reach the stored chain.
        assert!(ledger.verify().await.valid);
        assert!(!verify::verify_blocks(&exported).valid);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_invariants() {
        let ledger = InMemoryLedger::new();
        let mut handles = Vec::new();
        for task in 0..16 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..8 {
                    ledger
                        .append("EVENT", json!({"task": task, "seq": i}))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.len().await, 1 + 16 * 8);
        let report = ledger.verify().await;
        assert!(report.valid);
        assert_eq!(report.first_invalid_index, None);
    }
}
