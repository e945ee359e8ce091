//! WebSocket route streaming live batch progress.
//!
//! `GET /process?max_queries=N` upgrades to a WebSocket, enriches the stored
//! records and writes one JSON text frame per finished record, then a single
//! terminal frame, then a close frame.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use enricher_core::{Delivery, ProgressMessage, ProgressSink, SinkError};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Query string of the process route.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    /// Upper bound on records to enrich. Missing, zero, negative or
    /// unparseable means every stored record.
    #[serde(default)]
    pub max_queries: Option<String>,
}

impl ProcessParams {
    pub fn max_items(&self) -> usize {
        self.max_queries
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }
}

/// [`ProgressSink`] writing JSON text frames to a WebSocket sender.
///
/// Generic over the sink so the session logic can be driven without a real
/// socket.
pub struct WsProgressSink<S> {
    sender: S,
}

impl<S> WsProgressSink<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl<S> ProgressSink for WsProgressSink<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display,
{
    async fn send(&mut self, message: &ProgressMessage) -> Result<(), SinkError> {
        let json = serde_json::to_string(message).map_err(|e| SinkError::Encode(e.to_string()))?;
        self.sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| SinkError::Disconnected(e.to_string()))?;
        WS_MESSAGES_SENT.with_label_values(&[message.kind()]).inc();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.sender
            .send(Message::Close(None))
            .await
            .map_err(|e| SinkError::Disconnected(e.to_string()))
    }
}

/// WebSocket upgrade handler.
pub async fn process_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ProcessParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let max_items = params.max_items();
    ws.on_upgrade(move |socket| handle_socket(socket, state, max_items))
}

/// Handle a single progress session.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, max_items: usize) {
    let (sender, mut receiver) = socket.split();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("Progress client connected (max_queries={})", max_items);

    // Read client frames so pings get answered; the client has nothing to say.
    let reader = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Progress client requested close");
                    break;
                }
                Ok(Message::Text(text)) => debug!("Ignoring client message: {}", text),
                Ok(_) => {}
                Err(e) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
    });

    let delivery = run_batch(&state, max_items, WsProgressSink::new(sender)).await;
    if delivery.cancelled {
        WS_DISCONNECTS.inc();
    }

    reader.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!(
        "Progress client disconnected after {} messages",
        delivery.delivered
    );
}

/// Enrich the stored records, streaming progress to `sink`.
///
/// The store receives the batch records unless a worker task failed outright.
pub async fn run_batch<S>(state: &AppState, max_items: usize, sink: S) -> Delivery
where
    S: ProgressSink + 'static,
{
    let records = state.store().all().await;
    let (result, delivery) = state
        .processor()
        .process_streaming(records, max_items, sink)
        .await;

    match result {
        Ok(batch) => {
            if let Some(err) = batch.combined_error() {
                warn!("Error processing contracts: {}", err);
            }
            let count = state.store().replace(batch.records).await;
            info!("Stored {} processed contracts", count);
        }
        Err(e) => error!("Batch aborted, stored records left unchanged: {}", e),
    }

    delivery
}

#[cfg(test)]
mod tests {
    use super::*;
    use enricher_core::{
        testing::{fixtures, MockLookupSource},
        BatchProcessor, ChainRegistry, Config, EnrichmentConfig, LookupSource, RecordStore,
    };
    use futures::channel::mpsc;

    async fn state_with(source: &Arc<MockLookupSource>, records: usize) -> AppState {
        let processor = BatchProcessor::new(
            EnrichmentConfig::default().with_retry(1, 1),
            Arc::new(ChainRegistry::builtin()),
            Arc::clone(source) as Arc<dyn LookupSource>,
        );
        let store = RecordStore::new();
        store.replace(fixtures::records(records, "base")).await;
        AppState::new(Config::default(), processor, store)
    }

    fn text_frames(frames: &[Message]) -> Vec<serde_json::Value> {
        frames
            .iter()
            .filter_map(|m| match m {
                Message::Text(text) => Some(serde_json::from_str(text.as_str()).unwrap()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_max_queries_parsing() {
        let params = |v: Option<&str>| ProcessParams {
            max_queries: v.map(|s| s.to_string()),
        };
        assert_eq!(params(None).max_items(), 0);
        assert_eq!(params(Some("25")).max_items(), 25);
        assert_eq!(params(Some("-3")).max_items(), 0);
        assert_eq!(params(Some("lots")).max_items(), 0);
    }

    #[tokio::test]
    async fn test_session_streams_progress_then_result() {
        let source = Arc::new(MockLookupSource::new());
        source.set_found("0x1", fixtures::metadata("WETH9")).await;
        let state = state_with(&source, 3).await;

        let (tx, rx) = mpsc::unbounded();
        let delivery = run_batch(&state, 0, WsProgressSink::new(tx)).await;
        assert!(!delivery.cancelled);
        assert_eq!(delivery.delivered, 4);

        let frames: Vec<Message> = rx.collect().await;
        assert!(matches!(frames.last(), Some(Message::Close(None))));

        let json = text_frames(&frames);
        assert_eq!(json.len(), 4);
        assert_eq!(json[0]["total_contracts"], 3);
        assert_eq!(json[3]["message"], "Successfully processed 3 contracts");
        assert_eq!(json[3]["stats"]["contracts_with_name"], 1);

        let stored = state.store().all().await;
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().any(|r| r.name == "WETH9"));
    }

    #[tokio::test]
    async fn test_session_respects_max_queries() {
        let source = Arc::new(MockLookupSource::new());
        let state = state_with(&source, 10).await;

        let (tx, rx) = mpsc::unbounded();
        run_batch(&state, 4, WsProgressSink::new(tx)).await;

        let json = text_frames(&rx.collect::<Vec<_>>().await);
        assert_eq!(json.last().unwrap()["message"], "Successfully processed 4 contracts");
        assert_eq!(source.total_calls().await, 4);
    }

    #[tokio::test]
    async fn test_client_gone_cancels_delivery() {
        let source = Arc::new(MockLookupSource::new());
        let state = state_with(&source, 20).await;

        let (tx, rx) = mpsc::unbounded();
        drop(rx);
        let delivery = run_batch(&state, 0, WsProgressSink::new(tx)).await;

        assert!(delivery.cancelled);
        assert_eq!(delivery.delivered, 0);
        // The batch still ran to completion and was stored.
        assert_eq!(source.total_calls().await, 20);
        assert_eq!(state.store().len().await, 20);
    }
}
