// Seam between the scan orchestrator and the network-bound checks
use async_trait::async_trait;

use crate::models::scan::{CheckOutcome, FactorKind};
use crate::utils::url_normalizer::NormalizedUrl;

/// A network-bound risk check.
///
/// Implementations never return errors: failures are reported as
/// `CheckOutcome::Unreachable` or folded into a penalized `Completed` result.
/// The orchestrator enforces the deadline and maps timeouts to
/// `CheckOutcome::TimedOut`.
#[async_trait]
pub trait FactorProbe: Send + Sync {
    fn kind(&self) -> FactorKind;

    async fn probe(&self, url: &NormalizedUrl) -> CheckOutcome;
}
