//! Bounded progress channel and its delivery loop.

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{CancelFlag, ProgressMessage, ProgressSink};
use crate::enrichment::MIN_PROGRESS_BUFFER;

/// Create a progress channel. Capacity is raised to at least
/// [`MIN_PROGRESS_BUFFER`].
pub fn progress_channel(capacity: usize) -> (ProgressPublisher, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(MIN_PROGRESS_BUFFER));
    let cancel = CancelFlag::new();
    (
        ProgressPublisher {
            tx,
            cancel: cancel.clone(),
        },
        ProgressReceiver { rx, cancel },
    )
}

/// Producer half. Cheap to clone; the channel closes when every clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    tx: mpsc::Sender<ProgressMessage>,
    cancel: CancelFlag,
}

impl ProgressPublisher {
    /// Push a message unless the consumer is gone.
    ///
    /// Waits while the buffer is full. Returns `false` when the push was
    /// skipped because cancellation is active or the delivery loop has
    /// exited.
    pub async fn publish(&self, message: ProgressMessage) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if self.tx.send(message).await.is_err() {
            // Receiver dropped: nobody will ever read, treat as cancelled.
            self.cancel.cancel();
            return false;
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressMessage>,
    cancel: CancelFlag,
}

/// What the delivery loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Messages successfully pushed to the sink.
    pub delivered: usize,
    /// Whether the loop stopped because the sink failed.
    pub cancelled: bool,
}

impl ProgressReceiver {
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Forward every message to `sink` until the channel is closed and
    /// drained, or until the sink fails.
    ///
    /// On sink failure the cancel flag is raised and the loop returns without
    /// retrying; the receiver is dropped so blocked publishers wake up.
    pub async fn deliver<S: ProgressSink>(mut self, mut sink: S) -> Delivery {
        let mut delivered = 0;

        while let Some(message) = self.rx.recv().await {
            if let Err(e) = sink.send(&message).await {
                error!("Error writing progress message: {}", e);
                self.cancel.cancel();
                return Delivery {
                    delivered,
                    cancelled: true,
                };
            }
            delivered += 1;
        }

        if let Err(e) = sink.close().await {
            debug!("Progress sink close failed: {}", e);
        }

        Delivery {
            delivered,
            cancelled: false,
        }
    }
}
