//! # Upstream Gateway
//!
//! Outbound side of the proxy: turns a feed request into a single HTTP call
//! against the host index or the reputation index.

use async_trait::async_trait;
use kalium_common::config::{Config, UpstreamKeys};
use kalium_common::models::endpoint::Endpoint;
use kalium_protocols::{shodan, urlscan};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API responded with status: {0}")]
    Status(u16),
}

/// A fully resolved upstream call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn for_endpoint(
        endpoint: Endpoint,
        target: Option<&str>,
        query: Option<&str>,
        cfg: &Config,
        keys: UpstreamKeys<'_>,
    ) -> Self {
        let shodan_base = cfg.shodan_base_url.as_str();
        match endpoint {
            Endpoint::Scans => Self::plain(shodan::host_count_url(shodan_base, keys.shodan)),
            Endpoint::Sources => Self::plain(shodan::ports_url(shodan_base, keys.shodan)),
            Endpoint::Activity => {
                let q = shodan::activity_query(target, query);
                Self::plain(shodan::host_search_url(shodan_base, keys.shodan, &q))
            }
            Endpoint::Threats => {
                let q = urlscan::domain_query(target);
                Self {
                    url: urlscan::search_url(&cfg.urlscan_base_url, &q),
                    headers: vec![(urlscan::API_KEY_HEADER, keys.urlscan.to_string())],
                }
            }
        }
    }

    fn plain(url: String) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }
}

/// Performs upstream calls on behalf of the proxy.
#[async_trait]
pub trait UpstreamGateway: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError>;
}

/// [`UpstreamGateway`] backed by `reqwest` with client defaults (no retries, default timeouts).
#[derive(Clone, Default)]
pub struct HttpGateway {
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpstreamGateway for HttpGateway {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Upstream responded");
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config {
            shodan_api_key: Some("S".to_string()),
            urlscan_api_key: Some("U".to_string()),
            shodan_base_url: "http://shodan.test".to_string(),
            urlscan_base_url: "http://urlscan.test/".to_string(),
            ..Config::default()
        }
    }

    fn request(endpoint: Endpoint, target: Option<&str>, query: Option<&str>) -> UpstreamRequest {
        let cfg = cfg();
        let keys = cfg.upstream_keys().unwrap();
        UpstreamRequest::for_endpoint(endpoint, target, query, &cfg, keys)
    }

    #[test]
    fn test_scans_request() {
        let req = request(Endpoint::Scans, Some("ignored.com"), None);
        assert_eq!(
            req.url,
            "http://shodan.test/shodan/host/count?key=S&query=port%3A22%2C80%2C443"
        );
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_sources_request() {
        let req = request(Endpoint::Sources, None, None);
        assert_eq!(req.url, "http://shodan.test/shodan/ports?key=S");
    }

    #[test]
    fn test_activity_request_uses_target() {
        let req = request(Endpoint::Activity, Some("a.com"), None);
        assert_eq!(
            req.url,
            "http://shodan.test/shodan/host/search?key=S&query=hostname%3Aa.com"
        );
        let req = request(Endpoint::Activity, None, None);
        assert!(req.url.ends_with("query=port%3A80"));
    }

    #[test]
    fn test_threats_request_sends_key_header() {
        let req = request(Endpoint::Threats, Some("a.com"), None);
        assert_eq!(
            req.url,
            "http://urlscan.test/api/v1/search/?q=domain%3Aa.com&size=12"
        );
        assert_eq!(req.headers, vec![("API-Key", "U".to_string())]);
    }
}
