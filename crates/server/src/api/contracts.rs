//! Contract upload and retrieval routes.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use enricher_core::{load_records, ContractRecord};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// File name offered by the download route.
const DOWNLOAD_FILENAME: &str = "processed_contracts.json";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    let message = message.into();
    warn!("Rejected upload: {}", message);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// POST /api/v1/upload
///
/// Replace the stored records with the rows of an uploaded CSV (multipart
/// field `file`).
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(format!("Error reading form data: {}", e))),
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes.to_vec())),
            Err(e) => return Err(bad_request(format!("Failed to read file: {}", e))),
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| bad_request("Error getting form file: no file field"))?;
    info!(
        "Uploaded file: {}, size: {}",
        filename.as_deref().unwrap_or("<unnamed>"),
        data.len()
    );

    let records = load_records(data.as_slice())
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    let count = state.store().replace(records).await;
    info!("Loaded {} contracts from upload", count);

    Ok(Json(UploadResponse {
        message: format!("CSV processed successfully. Processed {} contracts.", count),
    }))
}

/// GET /api/v1/contracts
pub async fn list_contracts(State(state): State<Arc<AppState>>) -> Json<Vec<ContractRecord>> {
    Json(state.store().all().await)
}

/// GET /api/v1/download-results
///
/// Current records as a JSON attachment.
pub async fn download_results(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.store().all().await;
    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", DOWNLOAD_FILENAME),
        )],
        Json(records),
    )
}
