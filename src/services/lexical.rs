// Lexical URL analysis
// Pure heuristics over the normalized URL, no network access

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::HeuristicsConfig;
use crate::models::scan::FactorResult;
use crate::utils::url_normalizer::NormalizedUrl;

pub const NO_ISSUES_COMMENT: &str = "No issues detected";

// =============================================================================
// HOMOGRAPH DETECTOR
// =============================================================================

/// Flags hosts that mix Latin with Cyrillic or Greek letters, or that carry
/// punycode labels.
#[derive(Debug, Default, Clone)]
pub struct HomographDetector;

impl HomographDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn has_homograph_attack(&self, raw_host: &str, ascii_host: &str) -> bool {
        if ascii_host.split('.').any(|label| label.starts_with("xn--")) {
            return true;
        }

        let has_cyrillic = raw_host
            .chars()
            .any(|c| ('\u{0400}'..='\u{04FF}').contains(&c));
        let has_greek = raw_host
            .chars()
            .any(|c| ('\u{0370}'..='\u{03FF}').contains(&c));
        let has_latin = raw_host.chars().any(|c| c.is_ascii_alphabetic());

        let script_count = [has_cyrillic, has_greek, has_latin]
            .iter()
            .filter(|&&x| x)
            .count();
        script_count > 1
    }
}

/// Shannon entropy in bits per character
pub fn shannon_entropy(text: &str) -> f64 {
    let mut freq_map: HashMap<char, usize> = HashMap::new();
    for ch in text.chars() {
        *freq_map.entry(ch).or_insert(0) += 1;
    }

    let len = text.chars().count() as f64;
    if len == 0.0 {
        return 0.0;
    }

    freq_map
        .values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

// =============================================================================
// LEXICAL ANALYZER
// =============================================================================

pub struct LexicalAnalyzer {
    heuristics: Arc<HeuristicsConfig>,
    homograph_detector: HomographDetector,
}

impl LexicalAnalyzer {
    pub fn new(heuristics: Arc<HeuristicsConfig>) -> Self {
        Self {
            heuristics,
            homograph_detector: HomographDetector::new(),
        }
    }

    /// Score the URL. Each triggered heuristic adds its weight and reason.
    pub fn analyze(&self, url: &NormalizedUrl) -> FactorResult {
        let thresholds = &self.heuristics.thresholds;
        let mut score = 0u32;
        let mut reasons: Vec<&'static str> = Vec::new();

        let mut flag = |weight: u32, reason: &'static str| {
            score += weight;
            reasons.push(reason);
        };

        if url.is_ip_literal() {
            flag(2, "uses IP address instead of domain");
        }

        if url.subdomain_count() > thresholds.max_subdomains {
            flag(1, "excessive subdomains");
        }

        if url.original.chars().count() > thresholds.max_url_length {
            flag(1, "unusually long URL");
        }

        if self.mimics_legitimate_service(url) {
            flag(2, "contains suspicious keywords mimicking legitimate services");
        }

        if self.heuristics.is_shortener(&url.host, &url.registrable_domain) {
            flag(1, "shortened URL may hide destination");
        }

        if !url.is_ip_literal()
            && self
                .homograph_detector
                .has_homograph_attack(&url.raw_host, &url.host)
        {
            flag(2, "domain uses look-alike characters");
        }

        if self.is_random_looking(url) {
            flag(1, "random-looking domain name");
        }

        if url.has_userinfo {
            flag(2, "URL contains @ symbol");
        }

        if hyphen_count(&url.host) > thresholds.max_hyphens {
            flag(1, "excessive hyphens in domain");
        }

        debug!("Lexical analysis of {}: score {}", url.normalized, score);

        if reasons.is_empty() {
            FactorResult::clean(NO_ISSUES_COMMENT)
        } else {
            FactorResult::new(score, reasons.join("; "))
        }
    }

    /// Phishing vocabulary, or a brand name outside the brand's own domain.
    /// Trusted registrable domains never trigger.
    fn mimics_legitimate_service(&self, url: &NormalizedUrl) -> bool {
        if self.heuristics.is_trusted(&url.registrable_domain) {
            return false;
        }

        let haystack = format!("{}{}", url.host, url.path_and_query).to_lowercase();

        if self
            .heuristics
            .suspicious_keywords
            .iter()
            .any(|keyword| haystack.contains(keyword.as_str()))
        {
            return true;
        }

        let own_label = registrable_label(&url.registrable_domain);
        let tokens: Vec<&str> = haystack
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();
        self.heuristics.brand_names.iter().any(|brand| {
            own_label != brand.as_str() && tokens.iter().any(|token| *token == brand.as_str())
        })
    }

    fn is_random_looking(&self, url: &NormalizedUrl) -> bool {
        if url.is_ip_literal() {
            return false;
        }
        let thresholds = &self.heuristics.thresholds;
        let label = registrable_label(&url.registrable_domain);
        // Dictionary names like `stackoverflow` have no digits
        let mixes_digits = label.chars().any(|c| c.is_ascii_digit())
            && label.chars().any(|c| c.is_ascii_alphabetic());
        mixes_digits
            && label.chars().count() >= thresholds.entropy_min_length
            && shannon_entropy(label) > thresholds.entropy_threshold
    }
}

/// First label of the registrable domain (`paypal` for `paypal.co.uk`)
fn registrable_label(registrable_domain: &str) -> &str {
    registrable_domain.split('.').next().unwrap_or(registrable_domain)
}

/// Hyphens in the host, not counting punycode `xn--` prefixes
fn hyphen_count(host: &str) -> usize {
    host.split('.')
        .map(|label| label.strip_prefix("xn--").unwrap_or(label).matches('-').count())
        .sum()
}
