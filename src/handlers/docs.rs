// API documentation handler
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use crate::app::AppState;
use crate::app_config::{AppConfig, Environment};
use crate::models::scan::{
    ErrorResponse, FactorResult, RiskLevel, ScanFactors, ScanRequest, ScanResult,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Phishscan API",
        description = "URL phishing risk scoring: lexical analysis, domain age, TLS posture and reachability"
    ),
    paths(
        crate::handlers::scan::scan_url,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(ScanRequest, ScanResult, ScanFactors, FactorResult, RiskLevel, ErrorResponse)
    ),
    tags(
        (name = "Scan", description = "URL risk scanning"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification at /docs/openapi.json
pub async fn serve_openapi_spec(State(app_state): State<AppState>) -> Response {
    let spec = build_openapi_spec(app_state.config.as_ref());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&spec).unwrap_or_default(),
    )
        .into_response()
}

/// Generated document with the server list for the current environment
pub fn build_openapi_spec(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();

    let description = format!("Current server ({})", config.server.environment);
    let url = match config.server.environment {
        Environment::Production | Environment::Staging => "/".to_string(),
        _ => format!("http://localhost:{}", config.server.port),
    };
    spec.servers = Some(vec![utoipa::openapi::ServerBuilder::new()
        .url(url)
        .description(Some(description))
        .build()]);

    spec
}
