// Risk aggregation
use std::time::Duration;

use chrono::Utc;

use crate::models::scan::{RiskLevel, ScanFactors, ScanResult};
use crate::utils::scan_errors::ScanError;

pub const MEDIUM_RISK_THRESHOLD: u32 = 3;
pub const HIGH_RISK_THRESHOLD: u32 = 6;

pub fn risk_level_for(score: u32) -> RiskLevel {
    if score >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Human-readable verdict shown by the front-end
pub fn status_for(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "Phishing Website",
        RiskLevel::Medium => "Suspicious Website",
        RiskLevel::Low => "Safe Website",
    }
}

/// Sum the factor scores with checked arithmetic
pub fn total_score(factors: &ScanFactors) -> Result<u32, ScanError> {
    factors
        .scores()
        .iter()
        .try_fold(0u32, |acc, score| acc.checked_add(*score))
        .ok_or_else(|| ScanError::Internal("risk score overflow".to_string()))
}

pub fn aggregate(
    url: String,
    factors: ScanFactors,
    duration: Duration,
) -> Result<ScanResult, ScanError> {
    let risk_score = total_score(&factors)?;
    let risk_level = risk_level_for(risk_score);

    Ok(ScanResult {
        url,
        status: status_for(risk_level).to_string(),
        risk_score,
        risk_level,
        factors,
        scanned_at: Utc::now(),
        scan_duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
    })
}
