//! Blockscout HTTP lookup source.
//!
//! Issues a plain `GET {endpoint}{address}` per attempt. The endpoint comes
//! from the chain registry, so this client holds no base URL of its own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::ContractMetadata;
use super::{LookupError, LookupRequest, LookupSource};
use crate::metrics::{LOOKUP_DURATION, LOOKUP_REQUESTS};

/// Blockscout client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockscoutConfig {
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!("ContractEnricher/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

impl Default for BlockscoutConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

/// reqwest-backed [`LookupSource`].
pub struct BlockscoutSource {
    client: Client,
}

impl BlockscoutSource {
    /// Create a new Blockscout source.
    pub fn new(config: BlockscoutConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        Ok(Self { client })
    }

    async fn send(&self, request: &LookupRequest) -> Result<ContractMetadata, LookupError> {
        debug!("Fetching contract metadata: {}", request.url);

        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        let status = response.status();
        debug!("Blockscout response status for {}: {}", request.address, status);

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(request.address.clone()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Http(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!(
                "Blockscout request for {} failed with status {}",
                request.address, status
            );
            return Err(LookupError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| LookupError::Parse(e.to_string()))
    }
}

#[async_trait]
impl LookupSource for BlockscoutSource {
    fn name(&self) -> &str {
        "blockscout"
    }

    async fn lookup(&self, request: &LookupRequest) -> Result<ContractMetadata, LookupError> {
        let start = Instant::now();
        let result = self.send(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(LookupError::NotFound(_)) => "not_found",
            Err(LookupError::Parse(_)) => "parse_error",
            Err(_) => "error",
        };
        LOOKUP_REQUESTS
            .with_label_values(&[self.name(), outcome])
            .inc();
        LOOKUP_DURATION
            .with_label_values(&[self.name()])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}
