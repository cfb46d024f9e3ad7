// Scan endpoint handler
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::{
    app::AppState,
    models::scan::{ScanRequest, ScanResult},
    utils::scan_errors::ScanError,
};

/// Scan a URL for phishing risk
/// POST /scan
#[utoipa::path(
    post,
    path = "/scan",
    tag = "Scan",
    operation_id = "scanUrl",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan completed", body = ScanResult),
        (
            status = 400,
            description = "Missing, malformed or unsupported URL",
            body = ErrorResponse
        ),
        (
            status = 500,
            description = "Unexpected internal failure",
            body = ErrorResponse
        )
    )
)]
pub async fn scan_url(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResult>, ScanError> {
    let Json(request) = payload?;
    request.validate()?;

    debug!("Scan requested for {}", request.url);
    let result = state.scan_service.scan(&request.url).await?;

    Ok(Json(result))
}
