//! # Data-Fetch Client
//!
//! Typed reads over the proxy endpoint.
//!
//! Every read returns a [`FetchOutcome`], which keeps "the proxy answered
//! with nothing usable" ([`FetchOutcome::Empty`]) apart from "the call
//! failed" ([`FetchOutcome::Failed`]). Views that only want something to
//! render call [`FetchOutcome::or_default`], which logs failures and
//! collapses both cases to zero or an empty series.

use std::sync::Arc;

use async_trait::async_trait;
use kalium_common::error::EndpointError;
use kalium_common::models::activity::SystemActivity;
use kalium_common::models::endpoint::Endpoint;
use kalium_common::models::threat::{THREAT_KIND_MALICIOUS, ThreatData};
use kalium_common::utils::clock;
use kalium_protocols::shodan::{self, HostMatch};
use kalium_protocols::urlscan::{self, SearchResult};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::proxy::{ProxyQuery, ProxyService};
use crate::server::PROXY_PATH;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to proxy failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("proxy responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Result of a client read.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Data(T),
    /// The proxy answered, but not with the expected shape.
    Empty,
    Failed(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Data(value) => FetchOutcome::Data(f(value)),
            FetchOutcome::Empty => FetchOutcome::Empty,
            FetchOutcome::Failed(e) => FetchOutcome::Failed(e),
        }
    }
}

impl<T: Default> FetchOutcome<T> {
    /// Presentation-boundary collapse: failures are logged, then everything
    /// that is not data becomes `T::default()`.
    pub fn or_default(self) -> T {
        match self {
            FetchOutcome::Data(value) => value,
            FetchOutcome::Empty => T::default(),
            FetchOutcome::Failed(e) => {
                warn!(error = %e, "Fetch failed, showing defaults");
                T::default()
            }
        }
    }
}

/// How the client reaches the proxy.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    async fn get(&self, query: &ProxyQuery) -> Result<Value, FetchError>;
}

/// Calls a running proxy over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, query: &ProxyQuery) -> String {
        let params: Vec<String> = [
            ("endpoint", query.endpoint.as_deref()),
            ("target", query.target.as_deref()),
            ("query", query.query.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={}", urlencoding::encode(v))))
        .collect();

        format!(
            "{}{}?{}",
            self.base_url.trim_end_matches('/'),
            PROXY_PATH,
            params.join("&")
        )
    }
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    async fn get(&self, query: &ProxyQuery) -> Result<Value, FetchError> {
        let response = self.client.get(self.url(query)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

/// Calls the proxy service in-process, skipping the HTTP hop.
pub struct LocalTransport {
    proxy: Arc<ProxyService>,
}

impl LocalTransport {
    pub fn new(proxy: Arc<ProxyService>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl ProxyTransport for LocalTransport {
    async fn get(&self, query: &ProxyQuery) -> Result<Value, FetchError> {
        Ok(self.proxy.handle(query).await?)
    }
}

pub struct DataFetchClient {
    transport: Arc<dyn ProxyTransport>,
}

impl DataFetchClient {
    pub fn new(transport: Arc<dyn ProxyTransport>) -> Self {
        Self { transport }
    }

    /// Total scanned hosts.
    pub async fn recent_scans(&self) -> FetchOutcome<u64> {
        self.read(ProxyQuery::endpoint(Endpoint::Scans), |body| {
            body.get("total")
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite() && *n >= 0.0)
                .map(|n| n as u64)
        })
        .await
    }

    /// Number of data sources.
    pub async fn data_sources(&self) -> FetchOutcome<usize> {
        self.read(ProxyQuery::endpoint(Endpoint::Sources), |body| {
            body.as_array().map(Vec::len)
        })
        .await
    }

    pub async fn system_activity(&self) -> FetchOutcome<Vec<SystemActivity>> {
        self.read(ProxyQuery::endpoint(Endpoint::Activity), |body| {
            shodan::matches(&body).map(|list| list.into_iter().map(to_activity).collect())
        })
        .await
    }

    pub async fn threat_data(&self) -> FetchOutcome<Vec<ThreatData>> {
        self.read(ProxyQuery::endpoint(Endpoint::Threats), |body| {
            urlscan::results(&body).map(|list| list.into_iter().map(to_threat).collect())
        })
        .await
    }

    /// Raw host-index matches for a scan target.
    pub async fn host_lookup(&self, target: &str, query: &str) -> FetchOutcome<Vec<HostMatch>> {
        let request = ProxyQuery::endpoint(Endpoint::Activity)
            .with_target(target)
            .with_query(query);
        self.read(request, |body| shodan::matches(&body)).await
    }

    /// Raw reputation results for a scan target.
    pub async fn reputation_lookup(&self, target: &str) -> FetchOutcome<Vec<SearchResult>> {
        let request = ProxyQuery::endpoint(Endpoint::Threats).with_target(target);
        self.read(request, |body| urlscan::results(&body)).await
    }

    async fn read<T>(
        &self,
        query: ProxyQuery,
        extract: impl FnOnce(Value) -> Option<T>,
    ) -> FetchOutcome<T> {
        match self.transport.get(&query).await {
            Ok(body) => match extract(body) {
                Some(value) => FetchOutcome::Data(value),
                None => {
                    warn!(endpoint = ?query.endpoint, "Unexpected response shape");
                    FetchOutcome::Empty
                }
            },
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

fn to_activity(m: HostMatch) -> SystemActivity {
    SystemActivity {
        timestamp: m.timestamp.unwrap_or_else(clock::now_label),
        value: m.value.unwrap_or(0.0),
        port: m.port,
        product: m.product,
        version: m.version,
        vulns: m.vulns,
    }
}

fn to_threat(r: SearchResult) -> ThreatData {
    let (score, malicious) = match r.verdict {
        Some(v) => (v.score, Some(v.malicious)),
        None => (None, None),
    };
    ThreatData {
        timestamp: r.timestamp.unwrap_or_else(clock::now_label),
        count: r.count.unwrap_or(0),
        kind: THREAT_KIND_MALICIOUS.to_string(),
        domain: r.page.and_then(|p| p.domain),
        score,
        malicious,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalium_common::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Replies to every request with the same body, or fails.
    struct FixedTransport(Option<Value>);

    #[async_trait]
    impl ProxyTransport for FixedTransport {
        async fn get(&self, _query: &ProxyQuery) -> Result<Value, FetchError> {
            self.0.clone().ok_or(FetchError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn client(body: Option<Value>) -> DataFetchClient {
        DataFetchClient::new(Arc::new(FixedTransport(body)))
    }

    #[tokio::test]
    async fn test_empty_object_collapses_to_defaults() {
        let c = client(Some(json!({})));
        assert!(matches!(c.recent_scans().await, FetchOutcome::Empty));
        assert_eq!(c.recent_scans().await.or_default(), 0);
        assert_eq!(c.data_sources().await.or_default(), 0);
        assert!(c.system_activity().await.or_default().is_empty());
        assert!(c.threat_data().await.or_default().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_distinguishable_then_collapses() {
        let c = client(None);
        let outcome = c.recent_scans().await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.or_default(), 0);
        assert!(c.threat_data().await.or_default().is_empty());
    }

    #[tokio::test]
    async fn test_counts() {
        assert_eq!(client(Some(json!({"total": 512}))).recent_scans().await.data(), Some(&512));
        assert!(matches!(
            client(Some(json!({"total": "512"}))).recent_scans().await,
            FetchOutcome::Empty
        ));
        assert_eq!(
            client(Some(json!([1, 2, 3]))).data_sources().await.or_default(),
            3
        );
    }

    #[tokio::test]
    async fn test_activity_normalization() {
        let body = json!({"matches": [
            {"timestamp": "08:00", "value": 4, "port": 22, "product": "OpenSSH"},
            {"value": "x"}
        ]});
        let points = client(Some(body)).system_activity().await.or_default();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, "08:00");
        assert_eq!(points[0].value, 4.0);
        assert_eq!(points[0].port, Some(22));
        assert_eq!(points[0].product.as_deref(), Some("OpenSSH"));
        assert_eq!(points[1].value, 0.0);
        assert_eq!(points[1].timestamp.len(), 5);
    }

    #[tokio::test]
    async fn test_threat_normalization() {
        let body = json!({"results": [
            {"timestamp": "08:00", "count": 2, "page": {"domain": "a.io"},
             "verdicts": {"overall": {"score": 40, "malicious": false}}},
            {}
        ]});
        let threats = client(Some(body)).threat_data().await.or_default();
        assert_eq!(
            threats[0],
            ThreatData {
                timestamp: "08:00".to_string(),
                count: 2,
                kind: "malicious".to_string(),
                domain: Some("a.io".to_string()),
                score: Some(40.0),
                malicious: Some(false),
            }
        );
        assert_eq!(threats[1].count, 0);
        assert_eq!(threats[1].domain, None);
        assert_eq!(threats[1].malicious, None);
    }

    #[tokio::test]
    async fn test_local_transport_surfaces_endpoint_errors() {
        let proxy = Arc::new(ProxyService::with_http(Arc::new(Config::default())));
        let transport = LocalTransport::new(proxy);
        let err = transport
            .get(&ProxyQuery {
                endpoint: Some("bogus".to_string()),
                ..ProxyQuery::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Endpoint(EndpointError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_local_transport_mock_feeds() {
        let proxy = Arc::new(ProxyService::with_http(Arc::new(Config::default())));
        let c = DataFetchClient::new(Arc::new(LocalTransport::new(proxy)));
        let scans = c.recent_scans().await.or_default();
        assert!((100..=1099).contains(&scans));
        assert_eq!(c.system_activity().await.or_default().len(), 12);
        assert_eq!(c.threat_data().await.or_default().len(), 12);
        let hosts = c.host_lookup("a.com", "hostname:a.com").await;
        assert_eq!(hosts.data().map(Vec::len), Some(12));
    }

    #[test]
    fn test_http_transport_url() {
        let transport = HttpTransport::new("http://127.0.0.1:3000/");
        let url = transport.url(
            &ProxyQuery::endpoint(Endpoint::Activity)
                .with_target("a.com")
                .with_query("hostname:a.com port:22"),
        );
        assert_eq!(
            url,
            "http://127.0.0.1:3000/api/proxy?endpoint=activity&target=a.com&query=hostname%3Aa.com%20port%3A22"
        );
    }
}
