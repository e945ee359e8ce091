//! Configuration for the enrichment pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slot pool size used when none (or zero) is configured.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Smallest progress channel capacity handed out.
pub const MIN_PROGRESS_BUFFER: usize = 100;

/// Configuration for batch enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Maximum concurrent lookups. Zero falls back to the default.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Progress channel capacity.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,

    /// Per-request timeout for explorer lookups, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Fixed-delay retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per lookup, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_progress_buffer() -> usize {
    MIN_PROGRESS_BUFFER
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            progress_buffer: default_progress_buffer(),
            request_timeout_secs: default_request_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl EnrichmentConfig {
    /// Sets the slot pool size.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, max_attempts: u32, delay_ms: u64) -> Self {
        self.retry = RetryConfig {
            max_attempts,
            delay_ms,
        };
        self
    }

    /// Sets the progress channel capacity.
    pub fn with_progress_buffer(mut self, capacity: usize) -> Self {
        self.progress_buffer = capacity;
        self
    }

    /// Slot pool size actually used.
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrent == 0 {
            DEFAULT_MAX_CONCURRENT
        } else {
            self.max_concurrent
        }
    }

    /// Progress channel capacity actually used.
    pub fn effective_progress_buffer(&self) -> usize {
        self.progress_buffer.max(MIN_PROGRESS_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnrichmentConfig::default();
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.progress_buffer, 100);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_concurrency_falls_back() {
        let config = EnrichmentConfig::default().with_max_concurrent(0);
        assert_eq!(config.effective_concurrency(), DEFAULT_MAX_CONCURRENT);
    }

    #[test]
    fn test_progress_buffer_is_clamped() {
        let config = EnrichmentConfig::default().with_progress_buffer(8);
        assert_eq!(config.effective_progress_buffer(), 100);
        let config = EnrichmentConfig::default().with_progress_buffer(512);
        assert_eq!(config.effective_progress_buffer(), 512);
    }

    #[test]
    fn test_config_builder() {
        let config = EnrichmentConfig::default()
            .with_max_concurrent(3)
            .with_retry(5, 10);
        assert_eq!(config.effective_concurrency(), 3);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 10);
    }
}
