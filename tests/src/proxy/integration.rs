use std::sync::Arc;

use kalium_common::config::Config;
use kalium_common::models::endpoint::Endpoint;
use kalium_core::mock::MOCK_DATASET_LEN;
use kalium_core::proxy::{ProxyQuery, ProxyService};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::keyed_config;

fn proxy_for(server: &MockServer) -> ProxyService {
    ProxyService::with_http(Arc::new(keyed_config(&server.uri(), &server.uri())))
}

#[tokio::test]
async fn scans_pass_through_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/count"))
        .and(query_param("key", "s-key"))
        .and(query_param("query", "port:22,80,443"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 4242, "facets": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let body = proxy_for(&server)
        .handle(&ProxyQuery::endpoint(Endpoint::Scans))
        .await
        .unwrap();
    assert_eq!(body, json!({"total": 4242, "facets": {}}));
}

#[tokio::test]
async fn threats_send_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("q", "domain:evil.io"))
        .and(query_param("size", "12"))
        .and(header("API-Key", "u-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let body = proxy_for(&server)
        .handle(&ProxyQuery::endpoint(Endpoint::Threats).with_target("evil.io"))
        .await
        .unwrap();
    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn activity_uses_hostname_query_for_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/search"))
        .and(query_param("query", "hostname:a.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": [{"port": 22}]})))
        .expect(1)
        .mount(&server)
        .await;

    let body = proxy_for(&server)
        .handle(&ProxyQuery::endpoint(Endpoint::Activity).with_target("a.com"))
        .await
        .unwrap();
    assert_eq!(body["matches"][0]["port"], 22);
}

#[tokio::test]
async fn upstream_error_status_falls_back_to_mock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad key"})))
        .mount(&server)
        .await;

    let proxy = proxy_for(&server);

    let scans = proxy.handle(&ProxyQuery::endpoint(Endpoint::Scans)).await.unwrap();
    let total = scans["total"].as_u64().unwrap();
    assert!((100..1100).contains(&total));

    let sources = proxy.handle(&ProxyQuery::endpoint(Endpoint::Sources)).await.unwrap();
    let len = sources.as_array().unwrap().len();
    assert!((5..25).contains(&len));

    let activity = proxy.handle(&ProxyQuery::endpoint(Endpoint::Activity)).await.unwrap();
    assert_eq!(activity["matches"].as_array().unwrap().len(), MOCK_DATASET_LEN);
}

#[tokio::test]
async fn unreachable_upstream_falls_back_to_mock() {
    let cfg = keyed_config("http://127.0.0.1:9", "http://127.0.0.1:9");
    let proxy = ProxyService::with_http(Arc::new(cfg));

    let body = proxy
        .handle(&ProxyQuery::endpoint(Endpoint::Threats))
        .await
        .unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), MOCK_DATASET_LEN);
}

#[tokio::test]
async fn mock_mode_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = Config {
        shodan_api_key: Some("only-one".to_string()),
        shodan_base_url: server.uri(),
        urlscan_base_url: server.uri(),
        ..Config::default()
    };
    let proxy = ProxyService::with_http(Arc::new(cfg));

    for endpoint in Endpoint::ALL {
        proxy.handle(&ProxyQuery::endpoint(endpoint)).await.unwrap();
    }
}

#[tokio::test]
async fn repeated_mock_calls_keep_the_same_keys() {
    let proxy = ProxyService::with_http(Arc::new(Config::default()));
    let keys = |v: &serde_json::Value| {
        v["results"][0]
            .as_object()
            .map(|o| o.keys().cloned().collect::<Vec<_>>())
    };

    let first = proxy.handle(&ProxyQuery::endpoint(Endpoint::Threats).with_target("a.com")).await.unwrap();
    let second = proxy.handle(&ProxyQuery::endpoint(Endpoint::Threats).with_target("a.com")).await.unwrap();
    assert_eq!(keys(&first), keys(&second));
}
