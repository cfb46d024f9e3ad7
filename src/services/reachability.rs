// Reachability probing
// Bounded GET with a redirect cap, loop detection and cross-domain tracking

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use thiserror::Error;
use tracing::debug;

use crate::models::scan::{CheckOutcome, FactorKind, FactorResult};
use crate::services::probe::FactorProbe;
use crate::utils::url_normalizer::{NormalizedUrl, UrlNormalizer};

pub const REACHABLE_COMMENT: &str = "website is reachable";

/// Redirect policy violations raised from inside the reqwest policy
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("redirect loop detected")]
    Loop,

    #[error("too many redirects")]
    TooMany,
}

pub struct ReachabilityProber {
    client: Client,
    normalizer: Arc<UrlNormalizer>,
}

impl ReachabilityProber {
    pub fn new(
        normalizer: Arc<UrlNormalizer>,
        timeout: Duration,
        max_redirects: usize,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let policy = Policy::custom(move |attempt| {
            if attempt.previous().iter().any(|seen| seen == attempt.url()) {
                attempt.error(RedirectError::Loop)
            } else if attempt.previous().len() > max_redirects {
                attempt.error(RedirectError::TooMany)
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .redirect(policy)
            // Certificate validity is scored by the TLS inspector
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client, normalizer })
    }

    fn classify_send_error(&self, error: &reqwest::Error) -> CheckOutcome {
        if let Some(redirect_error) = find_redirect_error(error) {
            return CheckOutcome::Completed(FactorResult::new(1, redirect_error.to_string()));
        }
        if error.is_timeout() {
            return CheckOutcome::TimedOut;
        }
        CheckOutcome::Unreachable(error.to_string())
    }
}

/// Walk the error's source chain looking for a redirect policy violation
fn find_redirect_error(error: &reqwest::Error) -> Option<&RedirectError> {
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(err) = source {
        if let Some(redirect_error) = err.downcast_ref::<RedirectError>() {
            return Some(redirect_error);
        }
        source = err.source();
    }
    None
}

#[async_trait]
impl FactorProbe for ReachabilityProber {
    fn kind(&self) -> FactorKind {
        FactorKind::Reachability
    }

    async fn probe(&self, url: &NormalizedUrl) -> CheckOutcome {
        let response = match self.client.get(&url.normalized).send().await {
            Ok(response) => response,
            Err(e) => return self.classify_send_error(&e),
        };

        let status = response.status();
        let final_url = response.url().clone();
        // Only headers were needed; release the connection without reading the body
        drop(response);

        debug!(
            "Reachability of {}: {} (final URL {})",
            url.normalized, status, final_url
        );

        if let Some(final_host) = final_url.host_str() {
            let final_registrable = self.normalizer.registrable_domain(final_host);
            if final_registrable != url.registrable_domain {
                return CheckOutcome::Completed(FactorResult::new(
                    1,
                    "redirects to a different domain",
                ));
            }
        }

        if status.is_client_error() || status.is_server_error() {
            return CheckOutcome::Completed(FactorResult::new(1, "website returned an error"));
        }

        CheckOutcome::Completed(FactorResult::clean(REACHABLE_COMMENT))
    }
}
