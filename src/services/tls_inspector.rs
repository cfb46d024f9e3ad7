// TLS certificate inspection
// Performs a verified rustls handshake and classifies certificate failures

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{CertificateError, ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::models::scan::{CheckOutcome, FactorKind, FactorResult};
use crate::services::probe::FactorProbe;
use crate::utils::url_normalizer::NormalizedUrl;

pub const NO_HTTPS_COMMENT: &str = "site does not use HTTPS";
pub const VALID_CERT_COMMENT: &str = "valid SSL certificate";
const INVALID_OR_EXPIRED: &str = "invalid or expired certificate";
const HOSTNAME_MISMATCH: &str = "certificate does not match hostname";
const UNTRUSTED_ISSUER: &str = "certificate not issued by trusted authority";

pub struct TlsInspector {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsInspector {
    /// Build an inspector verifying against the bundled Mozilla roots
    pub fn new(timeout: Duration) -> Result<Self, rustls::Error> {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(root_store, timeout)
    }

    pub fn with_roots(
        root_store: RootCertStore,
        timeout: Duration,
    ) -> Result<Self, rustls::Error> {
        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    async fn handshake(&self, url: &NormalizedUrl) -> CheckOutcome {
        let host = url.server_name();
        let server_name = match ServerName::try_from(host.to_string()) {
            Ok(name) => name,
            Err(e) => return CheckOutcome::Unreachable(format!("invalid server name: {}", e)),
        };

        let stream = match timeout(self.timeout, TcpStream::connect((host, url.port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return CheckOutcome::Unreachable(format!("connect failed: {}", e)),
            Err(_) => return CheckOutcome::TimedOut,
        };

        match timeout(self.timeout, self.connector.connect(server_name, stream)).await {
            Ok(Ok(_tls_stream)) => {
                debug!("TLS handshake with {}:{} succeeded", host, url.port);
                CheckOutcome::Completed(FactorResult::clean(VALID_CERT_COMMENT))
            },
            Ok(Err(e)) => match certificate_error(&e).map(classify_certificate_error) {
                Some(result) => {
                    debug!("Certificate rejected for {}: {}", host, e);
                    CheckOutcome::Completed(result)
                },
                None => CheckOutcome::Unreachable(format!("handshake failed: {}", e)),
            },
            Err(_) => CheckOutcome::TimedOut,
        }
    }
}

/// Certificate error carried inside a handshake `io::Error`, if any
fn certificate_error(error: &io::Error) -> Option<&CertificateError> {
    match error.get_ref()?.downcast_ref::<rustls::Error>()? {
        rustls::Error::InvalidCertificate(cert_error) => Some(cert_error),
        _ => None,
    }
}

/// Map a rejected certificate to its penalized result
pub fn classify_certificate_error(error: &CertificateError) -> FactorResult {
    let comment = match error {
        CertificateError::Expired
        | CertificateError::ExpiredContext { .. }
        | CertificateError::NotValidYet
        | CertificateError::NotValidYetContext { .. } => INVALID_OR_EXPIRED,
        CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. } => {
            HOSTNAME_MISMATCH
        },
        CertificateError::UnknownIssuer | CertificateError::BadSignature => UNTRUSTED_ISSUER,
        _ => INVALID_OR_EXPIRED,
    };
    FactorResult::new(2, comment)
}

#[async_trait]
impl FactorProbe for TlsInspector {
    fn kind(&self) -> FactorKind {
        FactorKind::Ssl
    }

    async fn probe(&self, url: &NormalizedUrl) -> CheckOutcome {
        if !url.is_https() {
            return CheckOutcome::Completed(FactorResult::new(1, NO_HTTPS_COMMENT));
        }
        self.handshake(url).await
    }
}
