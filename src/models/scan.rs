// Scan request/response contract consumed by the browser front-end
// Field names here are part of the public contract - do not rename

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// =============================================================================
// REQUEST
// =============================================================================

/// Body of `POST /scan`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "url": "http://192.168.1.1/login-verify-account" }))]
pub struct ScanRequest {
    #[serde(default)]
    #[validate(length(max = 2048, message = "URL must be less than 2048 characters"))]
    pub url: String,
}

// =============================================================================
// FACTOR RESULTS
// =============================================================================

/// Score and explanation for a single risk factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FactorResult {
    pub score: u32,
    pub comment: String,
}

impl FactorResult {
    pub fn new(score: u32, comment: impl Into<String>) -> Self {
        Self {
            score,
            comment: comment.into(),
        }
    }

    pub fn clean(comment: impl Into<String>) -> Self {
        Self::new(0, comment)
    }
}

/// Tagged outcome of a network-bound check before failure policy is applied.
///
/// `TimedOut` and `Unreachable` are collapsed into the factor's documented
/// soft-failure result by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Completed(FactorResult),
    TimedOut,
    Unreachable(String),
}

/// Factors scored by a network probe. URL analysis runs inline and cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorKind {
    DomainAge,
    Ssl,
    Reachability,
}

impl FactorKind {
    /// Result used when the factor's collaborator failed or timed out
    pub fn soft_failure(&self) -> FactorResult {
        match self {
            FactorKind::DomainAge => FactorResult::new(1, "Unable to determine domain age"),
            FactorKind::Ssl => {
                FactorResult::new(1, "could not verify certificate (connection failed)")
            },
            FactorKind::Reachability => FactorResult::new(1, "website is not reachable"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::DomainAge => "domain_age",
            FactorKind::Ssl => "ssl",
            FactorKind::Reachability => "reachability",
        }
    }
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CheckOutcome {
    /// Collapse to a concrete result using the factor's soft-failure policy
    pub fn resolve(self, kind: FactorKind) -> FactorResult {
        match self {
            CheckOutcome::Completed(result) => result,
            CheckOutcome::TimedOut => {
                tracing::warn!("{} check timed out, using soft-failure result", kind);
                kind.soft_failure()
            },
            CheckOutcome::Unreachable(reason) => {
                tracing::warn!("{} check failed: {}", kind, reason);
                kind.soft_failure()
            },
        }
    }
}

// =============================================================================
// SCAN RESULT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScanFactors {
    pub url_analysis: FactorResult,
    pub domain_age: FactorResult,
    pub ssl: FactorResult,
    pub reachability: FactorResult,
}

impl ScanFactors {
    pub fn scores(&self) -> [u32; 4] {
        [
            self.url_analysis.score,
            self.domain_age.score,
            self.ssl.score,
            self.reachability.score,
        ]
    }
}

/// Response body of a completed scan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "url": "http://192.168.1.1/login-verify-account",
    "status": "Phishing Website",
    "risk_score": 6,
    "risk_level": "high",
    "factors": {
        "url_analysis": { "score": 4, "comment": "uses IP address instead of domain; contains suspicious keywords mimicking legitimate services" },
        "domain_age": { "score": 1, "comment": "Unable to determine domain age" },
        "ssl": { "score": 1, "comment": "site does not use HTTPS" },
        "reachability": { "score": 0, "comment": "website is reachable" }
    },
    "scanned_at": "2026-01-01T12:00:00Z",
    "scan_duration_ms": 412
}))]
pub struct ScanResult {
    pub url: String,
    pub status: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub factors: ScanFactors,
    pub scanned_at: DateTime<Utc>,
    pub scan_duration_ms: u64,
}

/// Error body returned for 4xx/5xx responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
