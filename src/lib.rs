// Library exports for the phishing scan backend
// The binary and the integration tests build the same router from here

pub mod app;
pub mod app_config;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, ConfigError};
pub use config::HeuristicsConfig;
pub use models::{FactorResult, RiskLevel, ScanRequest, ScanResult};
pub use services::{ScanService, ScanServiceError};
pub use utils::{ScanError, UrlNormalizer};

/// Build the shared state with production collaborators
pub fn initialize_app_state(config: AppConfig) -> Result<AppState, ScanServiceError> {
    let heuristics = Arc::new(HeuristicsConfig::load_or_default(&config.heuristics_path));

    info!(
        "Initializing scan service (overall timeout {}ms, max redirects {})",
        config.scan.overall_timeout_ms, config.scan.max_redirects
    );
    let scan_service = ScanService::from_config(&config.scan, heuristics)?;

    Ok(AppState {
        config: Arc::new(config),
        scan_service: Arc::new(scan_service),
    })
}

/// Assemble the router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::scan_routes())
        .merge(handlers::meta_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
