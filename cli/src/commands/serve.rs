use std::net::SocketAddr;
use std::sync::Arc;

use kalium_common::config::Config;
use kalium_core::proxy::ProxyService;
use kalium_core::server;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::commands::cancel_on_interrupt;
use crate::terminal::print;

pub async fn serve(bind: SocketAddr, cfg: Arc<Config>) -> anyhow::Result<()> {
    if cfg.is_mock_mode() {
        warn!("Upstream keys missing, every feed will be served from mock data");
    }

    let listener = TcpListener::bind(bind).await?;
    print::aligned_line("Listening", 9, format!("http://{}", listener.local_addr()?));
    print::aligned_line("Mode", 9, if cfg.is_mock_mode() { "mock" } else { "upstream" });

    let shutdown = CancellationToken::new();
    cancel_on_interrupt(shutdown.clone());

    let proxy = Arc::new(ProxyService::with_http(cfg));
    server::serve(listener, proxy, shutdown).await
}
