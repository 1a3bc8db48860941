use async_trait::async_trait;
use serde_json::Value;

use civicledger_types::Result;

use crate::block::Block;
use crate::verify::IntegrityReport;

/// Core audit-log trait — the seam a persistence-backed implementation would
/// plug into.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one recorded action, chained to the current tail, and return
    /// the stored block.
    async fn append(&self, action: &str, payload: Value) -> Result<Block>;

    /// The most recently appended block.
    async fn tail(&self) -> Block;

    /// Read-only snapshot of the full chain, in append order.
    async fn export(&self) -> Vec<Block>;

    /// Re-derive every digest and predecessor link from position 0.
    async fn verify(&self) -> IntegrityReport;

    /// Chain length, genesis included.
    async fn len(&self) -> usize;
}
