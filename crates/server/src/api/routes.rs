use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{contracts, handlers, ws};
use crate::state::AppState;

/// Upload size cap for CSV files.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.config().server.cors_origins);

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/chains", get(handlers::list_chains))
        .route("/metrics", get(handlers::get_metrics))
        // Contracts
        .route(
            "/upload",
            post(contracts::upload_csv).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/contracts", get(contracts::list_contracts))
        .route("/download-results", get(contracts::download_results))
        // Enrichment with live progress
        .route("/process", get(ws::process_handler))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    // Versioned paths plus the bare ones older clients use
    Router::new()
        .nest("/api/v1", api_routes.clone())
        .merge(api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS layer for the configured origins. An empty list or `"*"` allows any
/// origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
