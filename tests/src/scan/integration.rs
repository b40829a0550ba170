use std::sync::Arc;
use std::time::Duration;

use kalium_common::config::Config;
use kalium_common::models::progress::{ScanProgress, ScanState};
use kalium_common::models::scan::ScanKind;
use kalium_core::client::{DataFetchClient, LocalTransport};
use kalium_core::dashboard::Dashboard;
use kalium_core::proxy::ProxyService;
use kalium_core::scanner::{ScanError, ScanSimulator};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::keyed_config;

fn simulator(cfg: Config) -> ScanSimulator {
    let proxy = Arc::new(ProxyService::with_http(Arc::new(cfg)));
    let client = DataFetchClient::new(Arc::new(LocalTransport::new(proxy)));
    ScanSimulator::new(Arc::new(client)).with_step_delay(Duration::ZERO)
}

async fn run(
    sim: &ScanSimulator,
    kind: ScanKind,
    pairs: &[(&str, &str)],
) -> Result<(ScanState, Vec<ScanProgress>), ScanError> {
    let mut events = Vec::new();
    let report = sim
        .launch(kind, pairs.iter().copied(), &CancellationToken::new(), |p| events.push(p))
        .await?;
    Ok((report.state, events))
}

#[tokio::test]
async fn every_scan_type_completes_on_mock_data() {
    let sim = simulator(Config::default());

    for kind in [ScanKind::Quick, ScanKind::Full, ScanKind::Ports, ScanKind::Web, ScanKind::Malware] {
        let (state, events) = run(&sim, kind, &[("target", "example.com")]).await.unwrap();
        assert_eq!(state, ScanState::Completed, "{kind} did not complete");

        for pair in events.windows(2) {
            assert!(pair[0].progress <= pair[1].progress, "{kind}: {pair:?}");
        }
        let last = events.last().unwrap();
        assert_eq!(last.progress, 100);
        assert_eq!(last.status, "Scan completed");
        assert!(events[..events.len() - 1].iter().all(|e| e.progress < 100));
    }
}

#[tokio::test]
async fn mock_findings_are_narrated() {
    let sim = simulator(Config::default());
    let (_, events) = run(&sim, ScanKind::Web, &[("target", "a.com")]).await.unwrap();

    let statuses: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
    assert!(statuses.contains(&"Analyzing ports..."));
    assert_eq!(statuses.iter().filter(|s| **s == "Service detection").count(), 12);
    assert_eq!(statuses.iter().filter(|s| **s == "Web analysis").count(), 12);
    assert!(
        events
            .iter()
            .filter(|e| e.status == "Web analysis")
            .all(|e| e.details.as_deref() == Some("Domain: a.com"))
    );
}

#[tokio::test]
async fn full_scan_issues_its_own_host_query() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/search"))
        .and(query_param("query", "hostname:a.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{"port": 443, "product": "nginx", "version": "1.25"}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let sim = simulator(keyed_config(&upstream.uri(), &upstream.uri()));
    let (state, events) = run(&sim, ScanKind::Full, &[("target", "a.com"), ("depth", "3")])
        .await
        .unwrap();

    assert_eq!(state, ScanState::Completed);
    let details: Vec<&str> = events.iter().filter_map(|e| e.details.as_deref()).collect();
    assert!(details.contains(&"Open ports detected: 443"));
    assert!(details.contains(&"Port 443: nginx (v1.25)"));
}

#[tokio::test]
async fn upstream_outage_still_completes() {
    let sim = simulator(keyed_config("http://127.0.0.1:9", "http://127.0.0.1:9"));
    let (state, events) = run(&sim, ScanKind::Malware, &[("target", "a.com")]).await.unwrap();

    // The proxy answers with fallback data, so the scan narrates it instead of failing.
    assert_eq!(state, ScanState::Completed);
    assert!(events.iter().all(|e| !e.status.ends_with("failed")));
}

#[tokio::test]
async fn invalid_configuration_is_rejected() {
    let sim = simulator(Config::default());

    let err = run(&sim, ScanKind::Ports, &[("target", "a.com"), ("portRange", "all")])
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidParams(_)));

    let err = run(&sim, ScanKind::Quick, &[]).await.unwrap_err();
    assert!(matches!(err, ScanError::InvalidParams(_)));
    assert_eq!(sim.state(), ScanState::Failed);
}

#[tokio::test]
async fn stats_refresh_after_scan_on_shared_client() {
    let proxy = Arc::new(ProxyService::with_http(Arc::new(Config::default())));
    let client = Arc::new(DataFetchClient::new(Arc::new(LocalTransport::new(proxy))));
    let sim = ScanSimulator::new(client.clone()).with_step_delay(Duration::ZERO);

    let (state, _) = run(&sim, ScanKind::Quick, &[("target", "a.com")]).await.unwrap();
    assert_eq!(state, ScanState::Completed);

    let dashboard = Dashboard::new(client);
    assert!(dashboard.refresh().await);
    let snapshot = dashboard.latest();
    assert_eq!(snapshot.generation, 1);
    assert!((100..1100).contains(&snapshot.scans));
    assert_eq!(snapshot.activity.len(), 12);
}
