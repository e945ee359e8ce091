//! Types for the enrichment module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::contract::ContractRecord;

/// Point-in-time copy of the batch counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Records scheduled in this batch.
    pub total_contracts: usize,
    /// Records finished so far, enriched or not.
    pub processed_count: usize,
    /// Finished records that received a name.
    pub contracts_with_name: usize,
    /// Finished records flagged as proxies.
    pub proxy_contracts: usize,
    /// Human readable elapsed time (e.g. "1.52s").
    pub elapsed_time: String,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
}

impl ProgressSnapshot {
    pub(crate) fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_time = format!("{:.2?}", elapsed);
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    /// Whether every scheduled record has been processed.
    pub fn is_complete(&self) -> bool {
        self.processed_count >= self.total_contracts
    }
}

/// A non-fatal failure for one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("error processing contract {address}: {message}")]
pub struct ItemError {
    pub address: String,
    pub origin_key: String,
    pub message: String,
}

impl ItemError {
    pub fn new(record: &ContractRecord, message: impl Into<String>) -> Self {
        Self {
            address: record.address.clone(),
            origin_key: record.origin_key.clone(),
            message: message.into(),
        }
    }
}

/// What one worker task produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The record, enriched or passed through unchanged.
    Done(ContractRecord),
    /// The record as far as it got, plus the failure.
    Failed {
        record: ContractRecord,
        error: ItemError,
    },
}

impl TaskOutcome {
    pub fn into_parts(self) -> (ContractRecord, Option<ItemError>) {
        match self {
            TaskOutcome::Done(record) => (record, None),
            TaskOutcome::Failed { record, error } => (record, Some(error)),
        }
    }
}

/// Everything a batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Records in task completion order.
    pub records: Vec<ContractRecord>,
    /// Counters after the last merge.
    pub stats: ProgressSnapshot,
    /// Per-record failures.
    pub errors: Vec<ItemError>,
}

impl BatchResult {
    /// True when no record failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// A single error describing every failed record, if any failed.
    pub fn combined_error(&self) -> Option<BatchError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(BatchError::PartialFailure {
                failures: self.errors.clone(),
            })
        }
    }
}

/// Batch-level errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    /// One or more records failed; the batch still produced every record.
    #[error("encountered errors while processing contracts: {}", join_failures(.failures))]
    PartialFailure { failures: Vec<ItemError> },

    /// A worker task panicked or was cancelled; the batch output is unusable.
    #[error("worker task failed: {0}")]
    TaskPanicked(String),
}

fn join_failures(failures: &[ItemError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
