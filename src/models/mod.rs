pub mod scan;

// Re-export common types
pub use scan::{
    CheckOutcome, ErrorResponse, FactorKind, FactorResult, RiskLevel, ScanFactors, ScanRequest,
    ScanResult,
};
