//! # Proxy Service
//!
//! Mediates between the dashboard and the upstream intelligence services.
//!
//! Mode is decided per request from the injected [`Config`]: without both
//! upstream keys every feed is answered from [`crate::mock`]; with them, a
//! single upstream request is issued and any failure degrades to the mock
//! fallback payload.

use std::sync::Arc;

use kalium_common::config::Config;
use kalium_common::error::EndpointError;
use kalium_common::models::endpoint::Endpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::mock;
use crate::upstream::{HttpGateway, UpstreamGateway, UpstreamRequest};

/// Query string accepted by the proxy endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyQuery {
    pub endpoint: Option<String>,
    pub target: Option<String>,
    /// Host search query; only the activity feed reads it.
    pub query: Option<String>,
}

impl ProxyQuery {
    pub fn endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint: Some(endpoint.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

pub struct ProxyService {
    config: Arc<Config>,
    gateway: Arc<dyn UpstreamGateway>,
}

impl ProxyService {
    pub fn new(config: Arc<Config>, gateway: Arc<dyn UpstreamGateway>) -> Self {
        Self { config, gateway }
    }

    pub fn with_http(config: Arc<Config>) -> Self {
        Self::new(config, Arc::new(HttpGateway::default()))
    }

    pub fn is_mock_mode(&self) -> bool {
        self.config.is_mock_mode()
    }

    /// Answers one proxy request.
    ///
    /// The only error is a missing or unknown `endpoint`; upstream failures
    /// never surface to the caller.
    pub async fn handle(&self, query: &ProxyQuery) -> Result<Value, EndpointError> {
        let endpoint = Endpoint::from_param(query.endpoint.as_deref())?;
        let target = query.target.as_deref().filter(|t| !t.is_empty());

        let Some(keys) = self.config.upstream_keys() else {
            debug!(%endpoint, "Serving mock data");
            return Ok(mock::payload(endpoint, target));
        };

        let request = UpstreamRequest::for_endpoint(
            endpoint,
            target,
            query.query.as_deref(),
            &self.config,
            keys,
        );

        match self.gateway.fetch(&request).await {
            Ok(body) => Ok(body),
            Err(e) => {
                warn!(%endpoint, error = %e, "Upstream request failed, falling back to mock data");
                Ok(mock::fallback(endpoint))
            }
        }
    }
}
