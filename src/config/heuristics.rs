// Lexical heuristic thresholds and word lists
// Loaded from data/heuristics.json with a built-in fallback

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_HEURISTICS_PATH: &str = "data/heuristics.json";

#[derive(Error, Debug)]
pub enum HeuristicsError {
    #[error("Failed to read heuristics file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse heuristics file: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// JSON CONFIGURATION STRUCTURES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_url_length: usize,
    pub max_subdomains: usize,
    pub max_hyphens: usize,
    pub entropy_threshold: f64,
    pub entropy_min_length: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_url_length: 75,
            max_subdomains: 3,
            max_hyphens: 3,
            entropy_threshold: 3.5,
            entropy_min_length: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WordList {
    #[allow(dead_code)]
    #[serde(default)]
    description: String,
    entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HeuristicsFile {
    #[serde(default)]
    thresholds: Thresholds,
    suspicious_keywords: WordList,
    brand_names: WordList,
    trusted_domains: WordList,
    url_shorteners: WordList,
}

// =============================================================================
// HEURISTICS CONFIG
// =============================================================================

/// Immutable heuristic settings shared by every scan
#[derive(Debug, Clone)]
pub struct HeuristicsConfig {
    pub thresholds: Thresholds,
    pub suspicious_keywords: Vec<String>,
    pub brand_names: Vec<String>,
    pub trusted_domains: HashSet<String>,
    pub url_shorteners: HashSet<String>,
}

const FALLBACK_KEYWORDS: &[&str] = &[
    "login", "signin", "verify", "secure", "account", "update", "bank", "password", "confirm",
    "wallet", "suspended", "unlock",
];

const FALLBACK_BRANDS: &[&str] = &[
    "paypal",
    "apple",
    "icloud",
    "google",
    "microsoft",
    "office365",
    "amazon",
    "facebook",
    "instagram",
    "netflix",
    "chase",
    "wellsfargo",
    "bankofamerica",
    "dropbox",
];

const FALLBACK_TRUSTED: &[&str] = &[
    "paypal.com",
    "apple.com",
    "icloud.com",
    "google.com",
    "microsoft.com",
    "office365.com",
    "live.com",
    "amazon.com",
    "facebook.com",
    "instagram.com",
    "netflix.com",
    "chase.com",
    "wellsfargo.com",
    "bankofamerica.com",
    "dropbox.com",
];

const FALLBACK_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "t.co",
    "tiny.cc",
    "rb.gy",
    "cutt.ly",
    "shorturl.at",
    "s.id",
];

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            suspicious_keywords: to_lowercase_vec(FALLBACK_KEYWORDS.iter().copied()),
            brand_names: to_lowercase_vec(FALLBACK_BRANDS.iter().copied()),
            trusted_domains: FALLBACK_TRUSTED.iter().map(|d| d.to_string()).collect(),
            url_shorteners: FALLBACK_SHORTENERS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl HeuristicsConfig {
    /// Parse heuristics from a JSON document
    pub fn from_json(content: &str) -> Result<Self, HeuristicsError> {
        let file: HeuristicsFile = serde_json::from_str(content)?;

        Ok(Self {
            thresholds: file.thresholds,
            suspicious_keywords: to_lowercase_vec(
                file.suspicious_keywords.entries.iter().map(String::as_str),
            ),
            brand_names: to_lowercase_vec(file.brand_names.entries.iter().map(String::as_str)),
            trusted_domains: file
                .trusted_domains
                .entries
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            url_shorteners: file
                .url_shorteners
                .entries
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        })
    }

    /// Load from a JSON file, falling back to the built-in lists on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(config) => {
                    info!(
                        "Loaded {} keywords, {} brands, {} shorteners from {}",
                        config.suspicious_keywords.len(),
                        config.brand_names.len(),
                        config.url_shorteners.len(),
                        path.display()
                    );
                    config
                },
                Err(e) => {
                    error!("Failed to parse heuristics JSON: {}", e);
                    Self::fallback()
                },
            },
            Err(e) => {
                warn!(
                    "Failed to read heuristics file {}: {}. Using fallback lists.",
                    path.display(),
                    e
                );
                Self::fallback()
            },
        }
    }

    fn fallback() -> Self {
        warn!("Using fallback heuristics configuration");
        Self::default()
    }

    pub fn is_trusted(&self, registrable_domain: &str) -> bool {
        self.trusted_domains.contains(registrable_domain)
    }

    pub fn is_shortener(&self, host: &str, registrable_domain: &str) -> bool {
        self.url_shorteners.contains(host) || self.url_shorteners.contains(registrable_domain)
    }
}

fn to_lowercase_vec<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
