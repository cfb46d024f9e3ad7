// Utility modules for the scan backend

pub mod scan_errors;
pub mod url_normalizer;

pub use scan_errors::ScanError;
pub use url_normalizer::{HostKind, NormalizedUrl, Scheme, UrlNormalizer, ValidationError};
