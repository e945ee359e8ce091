//! In-memory holder for the current record set.

use tokio::sync::RwLock;

use crate::contract::ContractRecord;

/// The records most recently uploaded or enriched.
///
/// Process memory only; every replace swaps the whole set.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<ContractRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new record set, returning how many records it holds.
    pub async fn replace(&self, records: Vec<ContractRecord>) -> usize {
        let count = records.len();
        *self.records.write().await = records;
        count
    }

    /// Copy of the current records.
    pub async fn all(&self) -> Vec<ContractRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
