// Integration tests for POST /scan, /health and the OpenAPI document
mod common;

use axum::http::StatusCode;
use common::{setup_test_app, FakeProbe, FakeProbes};
use phishscan_backend::models::{CheckOutcome, FactorKind};
use serde_json::{json, Value};

#[tokio::test]
async fn test_scan_rejects_empty_url() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    let response = app.post("/scan").json(&json!({ "url": "   " })).send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await;
    assert_eq!(body["error"], "URL is required");
    assert_eq!(probes.total_calls(), 0);
}

#[tokio::test]
async fn test_scan_rejects_missing_url_field() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    let response = app.post("/scan").json(&json!({})).send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await;
    assert_eq!(body["error"], "URL is required");
}

#[tokio::test]
async fn test_scan_rejects_malformed_json() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    let response = app.post("/scan").raw_json("{ \"url\": ").send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await;
    assert!(body["error"].is_string());
    assert_eq!(probes.total_calls(), 0);
}

#[tokio::test]
async fn test_scan_rejects_unusable_urls_without_network_checks() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    for url in ["not-a-url", "ftp://example.com/file", "http://", "javascript:alert(1)"] {
        let response = app.post("/scan").json(&json!({ "url": url })).send().await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {}",
            url
        );
    }

    assert_eq!(probes.total_calls(), 0);
}

#[tokio::test]
async fn test_phishing_scenario_scores_high() {
    // Registry lookup fails for the IP literal, the site is plain HTTP and answers 2xx
    let probes = FakeProbes {
        domain_age: FakeProbe::with_outcome(
            FactorKind::DomainAge,
            CheckOutcome::Unreachable("IP literal".to_string()),
        ),
        tls: FakeProbe::completed(FactorKind::Ssl, 1, "site does not use HTTPS"),
        reachability: FakeProbe::completed(FactorKind::Reachability, 0, "website is reachable"),
    };
    let app = setup_test_app(&probes);

    let response = app
        .post("/scan")
        .json(&json!({ "url": "http://192.168.1.1/login-verify-account" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await;
    assert_eq!(body["factors"]["url_analysis"]["score"], 4);
    assert_eq!(body["factors"]["domain_age"]["score"], 1);
    assert_eq!(
        body["factors"]["domain_age"]["comment"],
        "Unable to determine domain age"
    );
    assert_eq!(body["factors"]["ssl"]["score"], 1);
    assert_eq!(body["factors"]["reachability"]["score"], 0);
    assert_eq!(body["risk_score"], 6);
    assert_eq!(body["risk_level"], "high");
    assert_eq!(body["status"], "Phishing Website");
    assert_eq!(probes.total_calls(), 3);
}

#[tokio::test]
async fn test_clean_site_scores_low() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    let response = app
        .post("/scan")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await;
    assert_eq!(body["risk_score"], 0);
    assert_eq!(body["risk_level"], "low");
    assert_eq!(body["status"], "Safe Website");
    assert_eq!(body["url"], "https://example.com/");
    assert_eq!(
        body["factors"]["url_analysis"]["comment"],
        "No issues detected"
    );
    assert!(body["scanned_at"].is_string());
    assert!(body["scan_duration_ms"].is_u64());
}

#[tokio::test]
async fn test_risk_score_matches_factor_sum() {
    let probes = FakeProbes {
        domain_age: FakeProbe::completed(FactorKind::DomainAge, 1, "recently registered domain"),
        tls: FakeProbe::completed(FactorKind::Ssl, 2, "certificate does not match hostname"),
        reachability: FakeProbe::completed(
            FactorKind::Reachability,
            1,
            "redirects to a different domain",
        ),
    };
    let app = setup_test_app(&probes);

    let response = app
        .post("/scan")
        .json(&json!({ "url": "https://example.com/" }))
        .send()
        .await;
    let body: Value = response.json().await;

    let sum: u64 = ["url_analysis", "domain_age", "ssl", "reachability"]
        .iter()
        .map(|f| body["factors"][f]["score"].as_u64().unwrap())
        .sum();
    assert_eq!(body["risk_score"].as_u64().unwrap(), sum);
    assert_eq!(body["risk_level"], "medium");
    assert_eq!(body["status"], "Suspicious Website");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let probes = FakeProbes::all_clean();
    let app = setup_test_app(&probes);

    let response = app.get("/health").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "healthy");

    let response = app.get("/docs/openapi.json").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert!(body["paths"]["/scan"].is_object());
}
