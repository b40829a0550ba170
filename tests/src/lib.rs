//! Tests that cross crate boundaries: the served proxy, upstream HTTP and
//! full scan runs.

#[cfg(test)]
mod client {
    mod integration;
}

#[cfg(test)]
mod proxy {
    mod integration;
}

#[cfg(test)]
mod scan {
    mod integration;
}

/// Helpers shared by the integration modules.
#[cfg(test)]
pub(crate) mod support {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use kalium_common::config::Config;
    use kalium_core::proxy::ProxyService;
    use kalium_core::server;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    pub fn keyed_config(shodan_url: &str, urlscan_url: &str) -> Config {
        Config {
            shodan_api_key: Some("s-key".to_string()),
            urlscan_api_key: Some("u-key".to_string()),
            shodan_base_url: shodan_url.to_string(),
            urlscan_base_url: urlscan_url.to_string(),
            ..Config::default()
        }
    }

    /// Serves the proxy on an ephemeral port until the returned token is cancelled.
    pub async fn spawn_proxy(cfg: Config) -> anyhow::Result<(SocketAddr, CancellationToken)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let proxy = Arc::new(ProxyService::with_http(Arc::new(cfg)));
        tokio::spawn(server::serve(listener, proxy, shutdown.clone()));
        Ok((addr, shutdown))
    }
}
