// HTTP handlers for the scan API

pub mod docs;
pub mod health;
pub mod scan;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

// Scan routes
pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/scan", post(scan::scan_url))
}

// Health and documentation routes
pub fn meta_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/docs/openapi.json", get(docs::serve_openapi_spec))
}
