//! Mock lookup source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::lookup::{ContractMetadata, LookupError, LookupRequest, LookupSource};

/// Scripted result of one lookup attempt.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// 200 with this body.
    Found(ContractMetadata),
    /// 404.
    NotFound,
    /// Any other status.
    ServerError(u16),
    /// Connection-level failure.
    Transport,
    /// 200 with an undecodable body.
    Malformed,
}

impl LookupOutcome {
    fn resolve(&self, address: &str) -> Result<ContractMetadata, LookupError> {
        match self {
            LookupOutcome::Found(meta) => Ok(meta.clone()),
            LookupOutcome::NotFound => Err(LookupError::NotFound(address.to_string())),
            LookupOutcome::ServerError(status) => Err(LookupError::Status {
                status: *status,
                message: "mock server error".to_string(),
            }),
            LookupOutcome::Transport => {
                Err(LookupError::Http("mock connection refused".to_string()))
            }
            LookupOutcome::Malformed => {
                Err(LookupError::Parse("expected value at line 1 column 1".to_string()))
            }
        }
    }
}

/// Mock implementation of the LookupSource trait.
///
/// Provides controllable behavior for testing:
/// - Script a sequence of outcomes per address (the last one repeats)
/// - Record every requested URL
/// - Track how many lookups run at once
///
/// Addresses with no script answer 404.
///
/// # Example
///
/// ```rust,ignore
/// use enricher_core::testing::{fixtures, LookupOutcome, MockLookupSource};
///
/// let source = MockLookupSource::new();
/// source.set_outcomes("0xabc", vec![
///     LookupOutcome::ServerError(500),
///     LookupOutcome::Found(fixtures::metadata("WETH9")),
/// ]).await;
///
/// // ... run a batch ...
///
/// assert_eq!(source.call_count("0xabc").await, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockLookupSource {
    /// Remaining scripted outcomes by address.
    scripts: Arc<RwLock<HashMap<String, Vec<LookupOutcome>>>>,
    /// Attempts made by address.
    calls: Arc<RwLock<HashMap<String, usize>>>,
    /// Every requested URL, in call order.
    urls: Arc<RwLock<Vec<String>>>,
    /// Artificial latency per lookup.
    latency: Arc<RwLock<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockLookupSource {
    /// Create a new mock lookup source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcomes for an address. Each attempt consumes one entry;
    /// the final entry is repeated for any further attempts.
    pub async fn set_outcomes(&self, address: &str, outcomes: Vec<LookupOutcome>) {
        self.scripts
            .write()
            .await
            .insert(address.to_string(), outcomes);
    }

    /// Shorthand for a single successful response.
    pub async fn set_found(&self, address: &str, metadata: ContractMetadata) {
        self.set_outcomes(address, vec![LookupOutcome::Found(metadata)])
            .await;
    }

    /// Delay every lookup by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Attempts made for an address.
    pub async fn call_count(&self, address: &str) -> usize {
        self.calls.read().await.get(address).copied().unwrap_or(0)
    }

    /// Attempts made across all addresses.
    pub async fn total_calls(&self) -> usize {
        self.calls.read().await.values().sum()
    }

    /// Every requested URL, in call order.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.urls.read().await.clone()
    }

    /// Highest number of lookups observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn next_outcome(&self, address: &str) -> LookupOutcome {
        let mut scripts = self.scripts.write().await;
        match scripts.get_mut(address) {
            Some(outcomes) if outcomes.len() > 1 => outcomes.remove(0),
            Some(outcomes) if !outcomes.is_empty() => outcomes[0].clone(),
            _ => LookupOutcome::NotFound,
        }
    }
}

#[async_trait]
impl LookupSource for MockLookupSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, request: &LookupRequest) -> Result<ContractMetadata, LookupError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        *self
            .calls
            .write()
            .await
            .entry(request.address.clone())
            .or_insert(0) += 1;
        self.urls.write().await.push(request.url.clone());

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let outcome = self.next_outcome(&request.address).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome.resolve(&request.address)
    }
}
