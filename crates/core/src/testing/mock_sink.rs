//! Recording progress sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::progress::{ProgressMessage, ProgressSink, SinkError};

#[derive(Debug, Default)]
struct SinkState {
    messages: Vec<ProgressMessage>,
    closed: bool,
}

/// A [`ProgressSink`] that keeps every message it receives.
///
/// Clones share state, so a test can hand one clone to the delivery loop
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<RwLock<SinkState>>,
    /// Reject every push after this many have succeeded.
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `n` messages and then reports a disconnect.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Default::default()
        }
    }

    /// Messages received so far.
    pub async fn messages(&self) -> Vec<ProgressMessage> {
        self.state.read().await.messages.clone()
    }

    /// The last message received, if any.
    pub async fn last(&self) -> Option<ProgressMessage> {
        self.state.read().await.messages.last().cloned()
    }

    /// Whether the delivery loop closed the sink.
    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn send(&mut self, message: &ProgressMessage) -> Result<(), SinkError> {
        let mut state = self.state.write().await;
        if let Some(limit) = self.fail_after {
            if state.messages.len() >= limit {
                return Err(SinkError::Disconnected("connection reset by peer".to_string()));
            }
        }
        state.messages.push(message.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.state.write().await.closed = true;
        Ok(())
    }
}
