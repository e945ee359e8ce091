//! Contract metadata lookups against Blockscout explorers.
//!
//! A [`LookupSource`] performs exactly one request and classifies the
//! outcome. [`FetchClient`] wraps a source with the fixed-delay retry policy
//! used by the enrichment pipeline.

mod blockscout;
mod fetch;
mod types;

pub use blockscout::{BlockscoutConfig, BlockscoutSource};
pub use fetch::{FetchClient, FetchError};
pub use types::ContractMetadata;

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a single lookup attempt that did not produce metadata.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The explorer answered 404. Terminal: the contract is simply unknown.
    #[error("contract not found: {0}")]
    NotFound(String),

    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The explorer answered with a non-success status other than 404.
    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response whose body is not the expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl LookupError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Http(_) | LookupError::Status { .. })
    }
}

/// A single lookup request: the full URL plus the address it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub url: String,
    pub address: String,
}

impl LookupRequest {
    /// Build a request by appending the address to the endpoint verbatim.
    pub fn new(endpoint: &str, address: &str) -> Self {
        Self {
            url: format!("{}{}", endpoint, address),
            address: address.to_string(),
        }
    }
}

/// One-shot metadata source.
///
/// Implementations must not retry; retry policy belongs to [`FetchClient`].
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &str;

    /// Perform one lookup attempt.
    async fn lookup(&self, request: &LookupRequest) -> Result<ContractMetadata, LookupError>;
}
