// Services module for the scan backend
// One module per risk factor plus aggregation and orchestration

pub mod aggregator;
pub mod domain_age;
pub mod lexical;
pub mod probe;
pub mod reachability;
pub mod scan;
pub mod tls_inspector;

// Re-export commonly used services
pub use aggregator::{aggregate, risk_level_for, status_for};
pub use domain_age::{DomainAgeError, DomainAgeResolver, RdapRegistry, RegistryDataSource};
pub use lexical::LexicalAnalyzer;
pub use probe::FactorProbe;
pub use reachability::ReachabilityProber;
pub use scan::{ScanProbes, ScanService, ScanServiceError, ScanTimeouts};
pub use tls_inspector::TlsInspector;
