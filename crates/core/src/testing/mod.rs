//! Testing utilities and mock implementations.
//!
//! This module provides a scripted [`LookupSource`](crate::lookup::LookupSource)
//! and a recording [`ProgressSink`](crate::progress::ProgressSink), allowing
//! full batch runs without a real explorer or WebSocket client.
//!
//! # Example
//!
//! ```rust,ignore
//! use enricher_core::testing::{fixtures, MockLookupSource, RecordingSink};
//!
//! let source = MockLookupSource::new();
//! source.set_found("0xabc", fixtures::metadata("WETH9")).await;
//!
//! let sink = RecordingSink::new();
//! // Use in BatchProcessor::process_streaming...
//! ```

mod mock_lookup;
mod mock_sink;

pub use mock_lookup::{LookupOutcome, MockLookupSource};
pub use mock_sink::RecordingSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::contract::ContractRecord;
    use crate::lookup::ContractMetadata;

    /// Verified, non-proxy contract metadata with the given name.
    pub fn metadata(name: &str) -> ContractMetadata {
        ContractMetadata {
            name: Some(name.to_string()),
            is_verified: Some(true),
            compiler_version: Some("v0.8.19+commit.7dd6d404".to_string()),
            verified_at: Some("2024-01-02T03:04:05.000000Z".to_string()),
            ..Default::default()
        }
    }

    /// Metadata for a minimal proxy pointing at `implementation`.
    pub fn proxy_metadata(name: &str, implementation: &str) -> ContractMetadata {
        ContractMetadata {
            minimal_proxy_address_hash: Some(implementation.to_string()),
            ..metadata(name)
        }
    }

    /// An unenriched record.
    pub fn record(address: &str, origin_key: &str) -> ContractRecord {
        ContractRecord::new(address, origin_key)
    }

    /// `count` unenriched records on one chain with addresses `0x0`, `0x1`, ...
    pub fn records(count: usize, origin_key: &str) -> Vec<ContractRecord> {
        (0..count)
            .map(|i| record(&format!("0x{:x}", i), origin_key))
            .collect()
    }

    /// A CSV upload body in the `encode,origin_key` layout.
    pub fn csv(rows: &[(&str, &str)]) -> String {
        let mut out = String::from("encode,origin_key\n");
        for (encode, origin) in rows {
            out.push_str(encode);
            out.push(',');
            out.push_str(origin);
            out.push('\n');
        }
        out
    }
}
