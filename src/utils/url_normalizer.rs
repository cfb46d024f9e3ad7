// URL normalization for scan requests
// Parses untrusted input into a canonical http(s) URL with a validated host

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tldextract::{TldExtractor, TldOption};
use tracing::debug;
use url::{Host, Url};

// =============================================================================
// STATIC REGEX PATTERNS
// =============================================================================

lazy_static! {
    /// Leading `scheme:` with the character that follows it.
    /// `example.com:8080` is a host and port, `mailto:x` is a scheme.
    static ref SCHEME_PREFIX: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):(.?)").expect("Invalid scheme prefix regex");
}

// =============================================================================
// CONSTANTS
// =============================================================================

pub const MAX_INPUT_LENGTH: usize = 2048;
const MAX_HOST_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported scheme: {0}. Only HTTP and HTTPS are supported")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("URL too long (max {max}, current {current})")]
    TooLong { max: usize, current: usize },

    #[error("URL contains suspicious characters")]
    SuspiciousCharacters,
}

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostKind {
    Domain,
    Ipv4,
    Ipv6,
}

/// Canonical form of a submitted URL.
///
/// `host` is lowercase ASCII (punycode for IDNs) with no trailing dot, and is
/// either a dotted domain name or an IP literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedUrl {
    pub original: String,
    pub normalized: String,
    pub scheme: Scheme,
    pub host: String,
    /// Host as typed by the user, before IDNA conversion
    pub raw_host: String,
    pub host_kind: HostKind,
    pub registrable_domain: String,
    pub port: u16,
    pub path_and_query: String,
    pub has_userinfo: bool,
}

impl NormalizedUrl {
    pub fn is_ip_literal(&self) -> bool {
        self.host_kind != HostKind::Domain
    }

    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Host without IPv6 brackets, as used for SNI and certificate matching
    pub fn server_name(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    /// Labels in front of the registrable domain
    pub fn subdomain_count(&self) -> usize {
        if self.is_ip_literal() {
            return 0;
        }
        let host_labels = self.host.split('.').count();
        let registrable_labels = self.registrable_domain.split('.').count();
        host_labels.saturating_sub(registrable_labels)
    }
}

// =============================================================================
// URL NORMALIZER
// =============================================================================

/// Parses and canonicalizes raw scan input.
///
/// Owns the Public Suffix List extractor, so build one at startup and share it.
pub struct UrlNormalizer {
    extractor: TldExtractor,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UrlNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlNormalizer").finish_non_exhaustive()
    }
}

impl UrlNormalizer {
    pub fn new() -> Self {
        Self {
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// Normalize raw input into a `NormalizedUrl`
    pub fn normalize(&self, raw: &str) -> Result<NormalizedUrl, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.len() > MAX_INPUT_LENGTH {
            return Err(ValidationError::TooLong {
                max: MAX_INPUT_LENGTH,
                current: trimmed.len(),
            });
        }

        if trimmed.chars().any(|c| c.is_control()) {
            return Err(ValidationError::SuspiciousCharacters);
        }

        let with_scheme = Self::ensure_scheme(trimmed)?;
        let mut url =
            Url::parse(&with_scheme).map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        };

        let (host, host_kind) = match url.host() {
            None => return Err(ValidationError::MissingHost),
            Some(Host::Domain(domain)) => {
                let domain = domain.trim_end_matches('.').to_string();
                Self::validate_domain(&domain)?;
                (domain, HostKind::Domain)
            },
            Some(Host::Ipv4(ip)) => (ip.to_string(), HostKind::Ipv4),
            Some(Host::Ipv6(ip)) => (format!("[{}]", ip), HostKind::Ipv6),
        };

        if host_kind == HostKind::Domain && url.host_str() != Some(host.as_str()) {
            url.set_host(Some(&host))
                .map_err(|e| ValidationError::InvalidHost(e.to_string()))?;
        }
        url.set_fragment(None);

        let port = url.port_or_known_default().unwrap_or(scheme.default_port());
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let has_userinfo = !url.username().is_empty() || url.password().is_some();
        let registrable_domain = match host_kind {
            HostKind::Domain => self.registrable_domain(&host),
            _ => host.clone(),
        };

        debug!(
            "Normalized {} -> {} (registrable: {})",
            trimmed, url, registrable_domain
        );

        Ok(NormalizedUrl {
            original: trimmed.to_string(),
            normalized: url.to_string(),
            scheme,
            raw_host: Self::raw_host(&with_scheme),
            host,
            host_kind,
            registrable_domain,
            port,
            path_and_query,
            has_userinfo,
        })
    }

    /// Registrable domain of a host per the Public Suffix List.
    /// Falls back to the last two labels when the list has no answer.
    pub fn registrable_domain(&self, host: &str) -> String {
        let host = host.trim_end_matches('.').to_lowercase();
        if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
            return host;
        }

        match self.extractor.extract(&format!("http://{}/", host)) {
            Ok(result) => match (result.domain, result.suffix) {
                (Some(domain), Some(suffix)) => return format!("{}.{}", domain, suffix),
                (Some(domain), None) => return domain,
                _ => {},
            },
            Err(e) => debug!("Public suffix lookup failed for {}: {}", host, e),
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() <= 2 {
            host.clone()
        } else {
            labels[labels.len() - 2..].join(".")
        }
    }

    /// Prefix `http://` when the input carries no scheme. Never promotes to https.
    fn ensure_scheme(input: &str) -> Result<String, ValidationError> {
        if input.contains("://") {
            return Ok(input.to_string());
        }
        if let Some(rest) = input.strip_prefix("//") {
            return Ok(format!("http://{}", rest));
        }

        if let Some(caps) = SCHEME_PREFIX.captures(input) {
            let following = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let is_port = following.chars().next().is_some_and(|c| c.is_ascii_digit());
            // `paypal.com:login@evil.example` is userinfo on a bare host
            let is_host = caps[1].contains('.');
            if !is_port && !is_host {
                return Err(ValidationError::UnsupportedScheme(caps[1].to_lowercase()));
            }
        }

        Ok(format!("http://{}", input))
    }

    fn validate_domain(domain: &str) -> Result<(), ValidationError> {
        if domain.is_empty() {
            return Err(ValidationError::MissingHost);
        }
        if domain.len() > MAX_HOST_LENGTH {
            return Err(ValidationError::InvalidHost(format!(
                "host exceeds {} characters",
                MAX_HOST_LENGTH
            )));
        }
        if !domain.contains('.') {
            return Err(ValidationError::InvalidHost(format!(
                "{} is not a fully qualified domain",
                domain
            )));
        }
        if let Some(bad) = domain
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Err(ValidationError::InvalidHost(format!(
                "character '{}' not allowed in host",
                bad
            )));
        }
        for label in domain.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
                return Err(ValidationError::InvalidHost(format!(
                    "invalid label in {}",
                    domain
                )));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(ValidationError::InvalidHost(format!(
                    "label {} starts or ends with a hyphen",
                    label
                )));
            }
        }
        Ok(())
    }

    /// Host segment of the input as typed (may contain non-ASCII characters)
    fn raw_host(with_scheme: &str) -> String {
        let after_scheme = with_scheme
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(with_scheme);
        let authority = after_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("");
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = if host_port.starts_with('[') {
            host_port
                .split_once(']')
                .map(|(h, _)| format!("{}]", h))
                .unwrap_or_else(|| host_port.to_string())
        } else {
            host_port.split(':').next().unwrap_or(host_port).to_string()
        };
        host.trim_end_matches('.').to_lowercase()
    }
}

// =============================================================================
// TESTS
// =============================================================================
