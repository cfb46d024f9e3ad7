// Centralized configuration management for the scan backend
// Load ALL env vars ONCE at startup, then pass the config down explicitly

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::config::heuristics::DEFAULT_HEURISTICS_PATH;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scan: ScanConfig,
    pub cors_allowed_origins: Vec<String>,
    pub heuristics_path: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Timeouts and limits for the network-bound checks.
///
/// Every timeout is strictly positive; `from_env` rejects zero so no outbound
/// call can block without a bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub overall_timeout_ms: u64,
    pub domain_age_timeout_ms: u64,
    pub tls_timeout_ms: u64,
    pub reachability_timeout_ms: u64,
    pub max_redirects: usize,
    pub rdap_base_url: String,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            overall_timeout_ms: 10_000,
            domain_age_timeout_ms: 5_000,
            tls_timeout_ms: 5_000,
            reachability_timeout_ms: 5_000,
            max_redirects: 5,
            rdap_base_url: "https://rdap.org".to_string(),
            user_agent: format!("phishscan/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScanConfig {
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    pub fn domain_age_timeout(&self) -> Duration {
        Duration::from_millis(self.domain_age_timeout_ms)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_millis(self.tls_timeout_ms)
    }

    pub fn reachability_timeout(&self) -> Duration {
        Duration::from_millis(self.reachability_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                port: 8080,
                environment: Environment::Development,
            },
            scan: ScanConfig::default(),
            cors_allowed_origins: vec!["*".to_string()],
            heuristics_path: DEFAULT_HEURISTICS_PATH.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        // Timeouts must be finite and non-zero
        let parse_timeout_ms = |key: &str, default: &str| -> Result<u64, ConfigError> {
            let value = parse_u64_or_default(key, default)?;
            if value == 0 {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    "timeout must be greater than zero".to_string(),
                ));
            }
            Ok(value)
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));

        let cors_allowed_origins: Vec<String> = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = ScanConfig::default();
        let overall_timeout_ms = parse_timeout_ms("SCAN_OVERALL_TIMEOUT_MS", "10000")?;
        let domain_age_timeout_ms = parse_timeout_ms("DOMAIN_AGE_TIMEOUT_MS", "5000")?;
        let tls_timeout_ms = parse_timeout_ms("TLS_TIMEOUT_MS", "5000")?;
        let reachability_timeout_ms = parse_timeout_ms("REACHABILITY_TIMEOUT_MS", "5000")?;

        let max_redirects: usize = get_or_default("MAX_REDIRECTS", "5").parse().map_err(|_| {
            ConfigError::InvalidValue("MAX_REDIRECTS".to_string(), "not a valid usize".to_string())
        })?;

        let rdap_base_url = get_or_default("RDAP_BASE_URL", &defaults.rdap_base_url)
            .trim_end_matches('/')
            .to_string();
        if url::Url::parse(&rdap_base_url).is_err() {
            return Err(ConfigError::InvalidValue(
                "RDAP_BASE_URL".to_string(),
                format!("not a valid URL: {}", rdap_base_url),
            ));
        }

        let user_agent = get_or_default("SCANNER_USER_AGENT", &defaults.user_agent);
        let heuristics_path = get_or_default("HEURISTICS_PATH", DEFAULT_HEURISTICS_PATH);

        Ok(Self {
            server: ServerConfig {
                bind_address,
                port,
                environment,
            },
            scan: ScanConfig {
                overall_timeout_ms,
                domain_age_timeout_ms,
                tls_timeout_ms,
                reachability_timeout_ms,
                max_redirects,
                rdap_base_url,
                user_agent,
            },
            cors_allowed_origins,
            heuristics_path,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }
}
