// Common test utilities and helper structs
// Shared across all test files to avoid duplication
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use phishscan_backend::{
    app::AppState,
    build_router,
    models::{CheckOutcome, FactorKind, FactorResult},
    services::{FactorProbe, ScanProbes, ScanService, ScanTimeouts},
    utils::{NormalizedUrl, UrlNormalizer},
    AppConfig, HeuristicsConfig,
};
use serde::Serialize;
use tower::util::ServiceExt;

// =============================================================================
// FAKE COLLABORATORS
// =============================================================================

/// Probe returning a fixed outcome, optionally after a delay
pub struct FakeProbe {
    kind: FactorKind,
    outcome: CheckOutcome,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn completed(kind: FactorKind, score: u32, comment: &str) -> Arc<Self> {
        Self::with_outcome(
            kind,
            CheckOutcome::Completed(FactorResult::new(score, comment)),
        )
    }

    pub fn with_outcome(kind: FactorKind, outcome: CheckOutcome) -> Arc<Self> {
        Arc::new(Self {
            kind,
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(kind: FactorKind, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            outcome: CheckOutcome::Completed(FactorResult::clean("finished late")),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactorProbe for FakeProbe {
    fn kind(&self) -> FactorKind {
        self.kind
    }

    async fn probe(&self, _url: &NormalizedUrl) -> CheckOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// The three network probes, each reporting a clean result
pub struct FakeProbes {
    pub domain_age: Arc<FakeProbe>,
    pub tls: Arc<FakeProbe>,
    pub reachability: Arc<FakeProbe>,
}

impl FakeProbes {
    pub fn all_clean() -> Self {
        Self {
            domain_age: FakeProbe::completed(
                FactorKind::DomainAge,
                0,
                "domain has been registered for a reasonable time",
            ),
            tls: FakeProbe::completed(FactorKind::Ssl, 0, "valid SSL certificate"),
            reachability: FakeProbe::completed(FactorKind::Reachability, 0, "website is reachable"),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.domain_age.calls() + self.tls.calls() + self.reachability.calls()
    }

    fn as_scan_probes(&self) -> ScanProbes {
        ScanProbes {
            domain_age: self.domain_age.clone(),
            tls: self.tls.clone(),
            reachability: self.reachability.clone(),
        }
    }
}

pub fn test_timeouts() -> ScanTimeouts {
    ScanTimeouts {
        overall: Duration::from_secs(10),
        domain_age: Duration::from_secs(5),
        tls: Duration::from_secs(5),
        reachability: Duration::from_secs(5),
    }
}

pub fn scan_service(probes: &FakeProbes, timeouts: ScanTimeouts) -> ScanService {
    ScanService::new(
        Arc::new(UrlNormalizer::new()),
        Arc::new(HeuristicsConfig::default()),
        probes.as_scan_probes(),
        timeouts,
    )
}

// =============================================================================
// TEST APPLICATION
// =============================================================================

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
}

impl TestApp {
    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    request: Request<Body>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &str, uri: &str) -> Self {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        Self { app, request }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(self, body: &T) -> Self {
        let body_bytes = serde_json::to_vec(body).unwrap();
        self.raw_json(body_bytes)
    }

    /// Add a raw body declared as JSON
    pub fn raw_json(mut self, body: impl Into<Body>) -> Self {
        self.request = Request::builder()
            .method(self.request.method().clone())
            .uri(self.request.uri().clone())
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let response = self.app.app.clone().oneshot(self.request).await.unwrap();
        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

/// Setup test application backed by the given fake probes
pub fn setup_test_app(probes: &FakeProbes) -> TestApp {
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        scan_service: Arc::new(scan_service(probes, test_timeouts())),
    };

    TestApp {
        app: build_router(state),
    }
}

// =============================================================================
// LOCAL MOCK SERVERS
// =============================================================================

/// Serve `router` on an ephemeral localhost port
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
