use std::sync::Arc;

use kalium_common::config::Config;
use kalium_common::error::EndpointError;
use kalium_core::client::{DataFetchClient, FetchError, FetchOutcome, HttpTransport, ProxyTransport};
use kalium_core::dashboard::Dashboard;
use kalium_core::proxy::ProxyQuery;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{keyed_config, spawn_proxy};

#[tokio::test]
async fn http_client_reads_mock_feeds() {
    let (addr, shutdown) = spawn_proxy(Config::default()).await.unwrap();
    let client = DataFetchClient::new(Arc::new(HttpTransport::new(format!("http://{addr}"))));

    let scans = client.recent_scans().await.or_default();
    assert!((100..1100).contains(&scans));

    let sources = client.data_sources().await.or_default();
    assert!((5..25).contains(&sources));

    let activity = client.system_activity().await.or_default();
    assert_eq!(activity.len(), 12);
    assert!(activity.iter().all(|a| a.port.is_some()));

    let threats = client.threat_data().await.or_default();
    assert_eq!(threats.len(), 12);
    assert!(threats.iter().all(|t| t.kind == "malicious"));

    shutdown.cancel();
}

#[tokio::test]
async fn http_transport_surfaces_bad_request() {
    let (addr, shutdown) = spawn_proxy(Config::default()).await.unwrap();
    let transport = HttpTransport::new(format!("http://{addr}"));

    let err = transport
        .get(&ProxyQuery {
            endpoint: Some("users".to_string()),
            ..ProxyQuery::default()
        })
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, EndpointError::Unknown(String::new()).to_string());
        }
        other => panic!("unexpected error: {other}"),
    }

    shutdown.cancel();
}

#[tokio::test]
async fn unexpected_upstream_shape_collapses_to_defaults() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": "many"})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;

    let (addr, shutdown) = spawn_proxy(keyed_config(&upstream.uri(), &upstream.uri()))
        .await
        .unwrap();
    let client = DataFetchClient::new(Arc::new(HttpTransport::new(format!("http://{addr}"))));

    assert!(matches!(client.recent_scans().await, FetchOutcome::Empty));
    assert!(matches!(client.threat_data().await, FetchOutcome::Empty));

    let dashboard = Dashboard::new(Arc::new(client));
    assert!(dashboard.refresh().await);
    let snapshot = dashboard.latest();
    assert_eq!(snapshot.scans, 0);
    assert_eq!(snapshot.sources, 0);
    assert!(snapshot.activity.is_empty());
    assert_eq!(snapshot.total_threats(), 0);

    shutdown.cancel();
}

#[tokio::test]
async fn unreachable_proxy_is_a_failure_not_empty() {
    let client = DataFetchClient::new(Arc::new(HttpTransport::new("http://127.0.0.1:9")));
    let outcome = client.recent_scans().await;
    assert!(outcome.is_failed());
    assert_eq!(outcome.or_default(), 0);
}
