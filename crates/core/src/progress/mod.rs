//! Progress delivery from a running batch to a single consumer.
//!
//! The producer side is a cloneable [`ProgressPublisher`] handed to every
//! worker task. The consumer side is a [`ProgressReceiver`] whose
//! [`deliver`](ProgressReceiver::deliver) loop forwards each message to a
//! [`ProgressSink`] (a WebSocket connection in the server). When the sink
//! fails, the loop raises the shared [`CancelFlag`] and stops; publishers
//! check the flag before every push and skip it once set.

mod streamer;

pub use streamer::{progress_channel, Delivery, ProgressPublisher, ProgressReceiver};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::enrichment::ProgressSnapshot;

/// Message delivered to the progress consumer.
///
/// Serialized untagged: a progress update is the bare snapshot object, the
/// terminal messages are `{"message", "stats"}` and `{"error"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProgressMessage {
    /// Batch finished without per-record failures.
    Completed {
        message: String,
        stats: ProgressSnapshot,
    },
    /// Batch finished with failures, or could not run.
    Failed { error: String },
    /// One record finished.
    Progress(ProgressSnapshot),
}

impl ProgressMessage {
    /// Terminal success message for a batch of `count` records.
    pub fn completed(count: usize, stats: ProgressSnapshot) -> Self {
        ProgressMessage::Completed {
            message: format!("Successfully processed {} contracts", count),
            stats,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        ProgressMessage::Failed {
            error: error.to_string(),
        }
    }

    /// Whether this message ends a batch.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressMessage::Progress(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressMessage::Completed { .. } => "completed",
            ProgressMessage::Failed { .. } => "failed",
            ProgressMessage::Progress(_) => "progress",
        }
    }
}

/// Failure pushing to a progress sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer went away.
    #[error("progress consumer disconnected: {0}")]
    Disconnected(String),

    /// The message could not be encoded.
    #[error("failed to encode progress message: {0}")]
    Encode(String),
}

/// The external consumer of progress messages.
#[async_trait]
pub trait ProgressSink: Send {
    /// Push one message. An error means the consumer is gone.
    async fn send(&mut self, message: &ProgressMessage) -> Result<(), SinkError>;

    /// Called once after the channel is drained.
    async fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Shared one-way cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            total_contracts: 2,
            processed_count: 1,
            contracts_with_name: 0,
            proxy_contracts: 0,
            elapsed_time: "1.00ms".to_string(),
            elapsed_ms: 1,
        }
    }

    #[test]
    fn test_progress_serializes_as_bare_snapshot() {
        let json = serde_json::to_value(ProgressMessage::Progress(snapshot())).unwrap();
        assert_eq!(json["processed_count"], 1);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_completed_wire_format() {
        let msg = ProgressMessage::completed(2, snapshot());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["message"], "Successfully processed 2 contracts");
        assert_eq!(json["stats"]["total_contracts"], 2);
        assert!(msg.is_terminal());
    }

    #[test]
    fn test_failed_wire_format() {
        let json = serde_json::to_string(&ProgressMessage::failed("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_untagged_round_trip_picks_right_variant() {
        let text = serde_json::to_string(&ProgressMessage::Progress(snapshot())).unwrap();
        let back: ProgressMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(back.kind(), "progress");

        let back: ProgressMessage = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert_eq!(back.kind(), "failed");
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
