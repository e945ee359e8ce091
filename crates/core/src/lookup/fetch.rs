//! Retrying fetch client.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{ContractMetadata, LookupError, LookupRequest, LookupSource};
use crate::enrichment::RetryConfig;
use crate::metrics::LOOKUP_RETRIES;

/// Terminal outcome of a fetch that produced no metadata.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The explorer does not know the contract. Not a batch error.
    #[error("contract not found")]
    NotFound,

    /// Every attempt failed with a retryable error.
    #[error("failed to fetch data after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: LookupError },

    /// A success response could not be decoded.
    #[error("{0}")]
    Parse(LookupError),
}

/// Fetches contract metadata with a bounded, fixed-delay retry loop.
#[derive(Clone)]
pub struct FetchClient {
    source: Arc<dyn LookupSource>,
    max_attempts: u32,
    delay: Duration,
}

impl FetchClient {
    pub fn new(source: Arc<dyn LookupSource>, retry: &RetryConfig) -> Self {
        Self {
            source,
            max_attempts: retry.max_attempts.max(1),
            delay: retry.delay(),
        }
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch metadata for `address` from `endpoint`.
    ///
    /// 404 and parse failures end the loop immediately. Transport errors and
    /// other statuses are retried after a fixed delay until the attempt limit
    /// is reached. No delay follows the final attempt.
    pub async fn fetch(&self, endpoint: &str, address: &str) -> Result<ContractMetadata, FetchError> {
        let request = LookupRequest::new(endpoint, address);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "Lookup attempt {}/{} for {}",
                attempt, self.max_attempts, request.url
            );

            let err = match self.source.lookup(&request).await {
                Ok(metadata) => return Ok(metadata),
                Err(LookupError::NotFound(_)) => return Err(FetchError::NotFound),
                Err(e @ LookupError::Parse(_)) => return Err(FetchError::Parse(e)),
                Err(e) => e,
            };

            if attempt >= self.max_attempts {
                warn!(
                    "Giving up on {} after {} attempts: {}",
                    address, attempt, err
                );
                return Err(FetchError::RetriesExhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }

            warn!(
                "Lookup attempt {} for {} failed, retrying in {:?}: {}",
                attempt, address, self.delay, err
            );
            LOOKUP_RETRIES
                .with_label_values(&[self.source.name()])
                .inc();
            sleep(self.delay).await;
        }
    }
}
