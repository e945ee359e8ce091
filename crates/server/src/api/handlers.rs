use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use enricher_core::{ChainInfo, Config};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body shared by every route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

#[derive(Serialize)]
pub struct ChainsResponse {
    pub chains: Vec<ChainInfo>,
    pub count: usize,
}

/// GET /api/v1/chains
///
/// Every origin key with its lookup endpoint and canonical chain id.
pub async fn list_chains(State(state): State<Arc<AppState>>) -> Json<ChainsResponse> {
    let chains: Vec<ChainInfo> = state.registry().chains().cloned().collect();
    Json(ChainsResponse {
        count: chains.len(),
        chains,
    })
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
