// Scan orchestration
// Normalizes the input, runs the lexical check inline and the three
// network-bound checks concurrently under per-check and overall deadlines

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::app_config::ScanConfig;
use crate::config::HeuristicsConfig;
use crate::models::scan::{CheckOutcome, FactorResult, ScanFactors, ScanResult};
use crate::services::aggregator;
use crate::services::domain_age::{DomainAgeError, DomainAgeResolver, RdapRegistry};
use crate::services::lexical::LexicalAnalyzer;
use crate::services::probe::FactorProbe;
use crate::services::reachability::ReachabilityProber;
use crate::services::tls_inspector::TlsInspector;
use crate::utils::scan_errors::ScanError;
use crate::utils::url_normalizer::{NormalizedUrl, UrlNormalizer};

#[derive(Error, Debug)]
pub enum ScanServiceError {
    #[error("Failed to build TLS client: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to build registry client: {0}")]
    Registry(#[from] DomainAgeError),
}

/// Per-check deadlines, each measured from the start of the scan
#[derive(Debug, Clone, Copy)]
pub struct ScanTimeouts {
    pub overall: Duration,
    pub domain_age: Duration,
    pub tls: Duration,
    pub reachability: Duration,
}

impl From<&ScanConfig> for ScanTimeouts {
    fn from(config: &ScanConfig) -> Self {
        Self {
            overall: config.overall_timeout(),
            domain_age: config.domain_age_timeout(),
            tls: config.tls_timeout(),
            reachability: config.reachability_timeout(),
        }
    }
}

/// The three network-bound collaborators
#[derive(Clone)]
pub struct ScanProbes {
    pub domain_age: Arc<dyn FactorProbe>,
    pub tls: Arc<dyn FactorProbe>,
    pub reachability: Arc<dyn FactorProbe>,
}

pub struct ScanService {
    normalizer: Arc<UrlNormalizer>,
    lexical: LexicalAnalyzer,
    probes: ScanProbes,
    timeouts: ScanTimeouts,
}

impl ScanService {
    pub fn new(
        normalizer: Arc<UrlNormalizer>,
        heuristics: Arc<HeuristicsConfig>,
        probes: ScanProbes,
        timeouts: ScanTimeouts,
    ) -> Self {
        Self {
            normalizer,
            lexical: LexicalAnalyzer::new(heuristics),
            probes,
            timeouts,
        }
    }

    /// Wire the production collaborators: RDAP, rustls and reqwest
    pub fn from_config(
        config: &ScanConfig,
        heuristics: Arc<HeuristicsConfig>,
    ) -> Result<Self, ScanServiceError> {
        let normalizer = Arc::new(UrlNormalizer::new());

        let registry = RdapRegistry::new(
            config.rdap_base_url.clone(),
            config.domain_age_timeout(),
            &config.user_agent,
        )?;
        let probes = ScanProbes {
            domain_age: Arc::new(DomainAgeResolver::new(Arc::new(registry))),
            tls: Arc::new(TlsInspector::new(config.tls_timeout())?),
            reachability: Arc::new(ReachabilityProber::new(
                normalizer.clone(),
                config.reachability_timeout(),
                config.max_redirects,
                &config.user_agent,
            )?),
        };

        Ok(Self::new(normalizer, heuristics, probes, config.into()))
    }

    /// Scan one URL. Only invalid input or an internal failure produce an error.
    pub async fn scan(&self, raw_url: &str) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let url = self.normalizer.normalize(raw_url)?;

        let url_analysis = self.lexical.analyze(&url);

        let overall_deadline = start + self.timeouts.overall;
        let deadline = |per_check: Duration| (start + per_check).min(overall_deadline);

        let (domain_age, ssl, reachability) = tokio::join!(
            run_probe(
                self.probes.domain_age.as_ref(),
                &url,
                deadline(self.timeouts.domain_age)
            ),
            run_probe(self.probes.tls.as_ref(), &url, deadline(self.timeouts.tls)),
            run_probe(
                self.probes.reachability.as_ref(),
                &url,
                deadline(self.timeouts.reachability)
            ),
        );

        let factors = ScanFactors {
            url_analysis,
            domain_age,
            ssl,
            reachability,
        };
        let result = aggregator::aggregate(url.normalized.clone(), factors, start.elapsed())?;

        info!(
            "Scanned {}: score {} ({}) in {}ms",
            result.url, result.risk_score, result.risk_level, result.scan_duration_ms
        );

        Ok(result)
    }
}

/// Run one check against its deadline and apply its soft-failure policy.
/// Dropping the probe future on timeout releases its connection.
async fn run_probe(
    probe: &dyn FactorProbe,
    url: &NormalizedUrl,
    deadline: Instant,
) -> FactorResult {
    let outcome = match timeout_at(deadline, probe.probe(url)).await {
        Ok(outcome) => outcome,
        Err(_) => CheckOutcome::TimedOut,
    };
    debug!("{} check for {}: {:?}", probe.kind(), url.host, outcome);
    outcome.resolve(probe.kind())
}
