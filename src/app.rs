// Application state shared across handlers
use std::sync::Arc;

use crate::{app_config::AppConfig, services::ScanService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scan_service: Arc<ScanService>,
}
