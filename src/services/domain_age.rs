// Domain age lookup over RDAP
// Newly registered domains are a strong phishing signal

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::scan::{CheckOutcome, FactorKind, FactorResult};
use crate::services::probe::FactorProbe;
use crate::utils::url_normalizer::NormalizedUrl;

const VERY_RECENT_DAYS: i64 = 30;
const RECENT_DAYS: i64 = 180;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum DomainAgeError {
    #[error("Domain not found in registry: {0}")]
    NotFound(String),

    #[error("Registry returned status {0}")]
    Status(u16),

    #[error("Registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry response has no registration date")]
    MissingCreationDate,

    #[error("Invalid registration date: {0}")]
    InvalidDate(String),
}

// =============================================================================
// REGISTRY DATA SOURCE
// =============================================================================

/// Source of domain registration dates
#[async_trait]
pub trait RegistryDataSource: Send + Sync {
    async fn creation_date(&self, domain: &str) -> Result<DateTime<Utc>, DomainAgeError>;
}

#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    event_action: String,
    #[serde(rename = "eventDate")]
    event_date: Option<String>,
}

/// RDAP client resolving `{base_url}/domain/{domain}`
pub struct RdapRegistry {
    client: Client,
    base_url: String,
}

impl RdapRegistry {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, DomainAgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            // rdap.org answers with a redirect to the authoritative registry
            .redirect(Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RegistryDataSource for RdapRegistry {
    async fn creation_date(&self, domain: &str) -> Result<DateTime<Utc>, DomainAgeError> {
        let url = format!("{}/domain/{}", self.base_url, domain);
        debug!("RDAP lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/rdap+json, application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(DomainAgeError::NotFound(domain.to_string())),
            status if !status.is_success() => {
                return Err(DomainAgeError::Status(status.as_u16()))
            },
            _ => {},
        }

        let body: RdapDomain = response.json().await?;
        parse_registration_date(&body)
    }
}

fn parse_registration_date(body: &RdapDomain) -> Result<DateTime<Utc>, DomainAgeError> {
    let raw = body
        .events
        .iter()
        .find(|event| event.event_action.eq_ignore_ascii_case("registration"))
        .and_then(|event| event.event_date.as_deref())
        .ok_or(DomainAgeError::MissingCreationDate)?;

    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| DomainAgeError::InvalidDate(raw.to_string()))
}

// =============================================================================
// SCORING
// =============================================================================

/// Score a known creation date relative to `now`
pub fn score_domain_age(created: DateTime<Utc>, now: DateTime<Utc>) -> FactorResult {
    if created > now {
        return FactorResult::new(2, "domain has a future creation date");
    }

    let age_days = (now - created).num_days();
    if age_days < VERY_RECENT_DAYS {
        FactorResult::new(2, "very recently registered domain")
    } else if age_days < RECENT_DAYS {
        FactorResult::new(1, "recently registered domain")
    } else {
        FactorResult::clean("domain has been registered for a reasonable time")
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

pub struct DomainAgeResolver {
    registry: Arc<dyn RegistryDataSource>,
}

impl DomainAgeResolver {
    pub fn new(registry: Arc<dyn RegistryDataSource>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl FactorProbe for DomainAgeResolver {
    fn kind(&self) -> FactorKind {
        FactorKind::DomainAge
    }

    async fn probe(&self, url: &NormalizedUrl) -> CheckOutcome {
        if url.is_ip_literal() {
            return CheckOutcome::Unreachable(format!(
                "{} is an IP literal with no registration record",
                url.host
            ));
        }

        match self.registry.creation_date(&url.registrable_domain).await {
            Ok(created) => {
                debug!("{} registered at {}", url.registrable_domain, created);
                CheckOutcome::Completed(score_domain_age(created, Utc::now()))
            },
            Err(e) => CheckOutcome::Unreachable(e.to_string()),
        }
    }
}
