//! Batch enrichment of contract records.
//!
//! The `BatchProcessor` fans a batch out to one task per record:
//! - Admission: a fixed-size semaphore bounds concurrent lookups
//! - Lookup: `FetchClient` with bounded retry
//! - Mapping: pure `apply_metadata`
//! - Aggregation: `StatsAggregator` appends the record and updates counters
//!   under one lock, producing a consistent `ProgressSnapshot`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use enricher_core::{BatchProcessor, BlockscoutSource, ChainRegistry, EnrichmentConfig};
//!
//! let source = Arc::new(BlockscoutSource::new(Default::default())?);
//! let processor = BatchProcessor::new(
//!     EnrichmentConfig::default(),
//!     Arc::new(ChainRegistry::builtin()),
//!     source,
//! );
//!
//! let result = processor.process(records, 0, None).await?;
//! if let Some(err) = result.combined_error() {
//!     eprintln!("{}", err);
//! }
//! ```

mod config;
mod processor;
mod stats;
mod types;

pub use config::{EnrichmentConfig, RetryConfig, DEFAULT_MAX_CONCURRENT, MIN_PROGRESS_BUFFER};
pub use processor::BatchProcessor;
pub use stats::StatsAggregator;
pub use types::{BatchError, BatchResult, ItemError, ProgressSnapshot, TaskOutcome};
