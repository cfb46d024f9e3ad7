// TLS inspection against local rustls servers
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use phishscan_backend::{
    models::{CheckOutcome, FactorResult},
    services::{FactorProbe, TlsInspector},
    utils::UrlNormalizer,
};
use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{RootCertStore, ServerConfig};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

struct TestCa {
    cert: Certificate,
    key: KeyPair,
}

impl TestCa {
    fn new() -> Self {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, "phishscan test CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    fn roots(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.der().clone()).unwrap();
        roots
    }

    fn issue(
        &self,
        params: CertificateParams,
    ) -> (CertificateDer<'static>, PrivateKeyDer<'static>) {
        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        (cert.der().clone(), pkcs8(&key))
    }
}

fn leaf_params(names: &[&str]) -> CertificateParams {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let mut params = CertificateParams::new(names).unwrap();
    params
        .distinguished_name
        .push(DnType::CommonName, "phishscan test site");
    params
}

fn pkcs8(key: &KeyPair) -> PrivateKeyDer<'static> {
    PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()))
}

/// Accept TLS connections on a random local port until the test ends
async fn spawn_tls_server(
    cert: CertificateDer<'static>,
    key: PrivateKeyDer<'static>,
) -> SocketAddr {
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![cert], key)
    .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let _ = acceptor.accept(stream).await;
            });
        }
    });
    addr
}

async fn inspect(inspector: &TlsInspector, addr: SocketAddr) -> CheckOutcome {
    let url = UrlNormalizer::new()
        .normalize(&format!("https://127.0.0.1:{}/", addr.port()))
        .unwrap();
    inspector.probe(&url).await
}

#[tokio::test]
async fn test_self_signed_certificate_is_untrusted() {
    let certified = rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string()]).unwrap();
    let addr = spawn_tls_server(certified.cert.der().clone(), pkcs8(&certified.key_pair)).await;

    let inspector = TlsInspector::new(Duration::from_secs(2)).unwrap();
    assert_eq!(
        inspect(&inspector, addr).await,
        CheckOutcome::Completed(FactorResult::new(
            2,
            "certificate not issued by trusted authority"
        ))
    );
}

#[tokio::test]
async fn test_trusted_certificate_is_valid() {
    let ca = TestCa::new();
    let (cert, key) = ca.issue(leaf_params(&["127.0.0.1"]));
    let addr = spawn_tls_server(cert, key).await;

    let inspector = TlsInspector::with_roots(ca.roots(), Duration::from_secs(2)).unwrap();
    assert_eq!(
        inspect(&inspector, addr).await,
        CheckOutcome::Completed(FactorResult::clean("valid SSL certificate"))
    );
}

#[tokio::test]
async fn test_certificate_for_other_host_is_mismatch() {
    let ca = TestCa::new();
    let (cert, key) = ca.issue(leaf_params(&["shop.example.org"]));
    let addr = spawn_tls_server(cert, key).await;

    let inspector = TlsInspector::with_roots(ca.roots(), Duration::from_secs(2)).unwrap();
    assert_eq!(
        inspect(&inspector, addr).await,
        CheckOutcome::Completed(FactorResult::new(
            2,
            "certificate does not match hostname"
        ))
    );
}

#[tokio::test]
async fn test_expired_certificate() {
    let ca = TestCa::new();
    let mut params = leaf_params(&["127.0.0.1"]);
    params.not_before = rcgen::date_time_ymd(2020, 1, 1);
    params.not_after = rcgen::date_time_ymd(2021, 1, 1);
    let (cert, key) = ca.issue(params);
    let addr = spawn_tls_server(cert, key).await;

    let inspector = TlsInspector::with_roots(ca.roots(), Duration::from_secs(2)).unwrap();
    assert_eq!(
        inspect(&inspector, addr).await,
        CheckOutcome::Completed(FactorResult::new(2, "invalid or expired certificate"))
    );
}

#[tokio::test]
async fn test_server_that_never_handshakes_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let inspector = TlsInspector::new(Duration::from_millis(300)).unwrap();
    assert_eq!(inspect(&inspector, addr).await, CheckOutcome::TimedOut);
}
