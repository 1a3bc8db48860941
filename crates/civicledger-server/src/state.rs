use std::sync::Arc;

use dashmap::DashMap;

use civicledger_ledger::{AuditLog, InMemoryLedger};
use civicledger_types::Session;

use crate::storage::MemStorage;

/// Shared state for the whole service.
///
/// The ledger is constructed here, at the composition root, and handed to
/// collaborators as a trait object — no process-wide statics, so every test
/// gets an independent chain.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn AuditLog>,
    pub storage: Arc<MemStorage>,
    pub sessions: Arc<DashMap<String, Session>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(InMemoryLedger::new()),
            storage: Arc::new(MemStorage::new()),
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
