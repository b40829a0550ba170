pub mod catalog;
pub mod dashboard;
pub mod login;
pub mod scan;
pub mod serve;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kalium_common::config::Config;
use kalium_common::models::scan::ScanKind;
use kalium_core::client::{DataFetchClient, HttpTransport, LocalTransport, ProxyTransport};
use kalium_core::proxy::ProxyService;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "kalium")]
#[command(about = "An OSINT dashboard with a simulated scanner.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Host index API key
    #[arg(long, global = true, env = "SHODAN_API_KEY", hide_env_values = true)]
    pub shodan_key: Option<String>,

    /// URL reputation API key
    #[arg(long, global = true, env = "URLSCAN_API_KEY", hide_env_values = true)]
    pub urlscan_key: Option<String>,

    /// Host index base URL
    #[arg(long, global = true, env = "KALIUM_SHODAN_URL", hide = true)]
    pub shodan_url: Option<String>,

    /// URL reputation base URL
    #[arg(long, global = true, env = "KALIUM_URLSCAN_URL", hide = true)]
    pub urlscan_url: Option<String>,

    /// Talk to a running proxy instead of serving requests in-process
    #[arg(long, global = true, env = "KALIUM_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Less output, repeat for even less
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Skip the staged pauses between scan phases
    #[arg(long, global = true)]
    pub no_delay: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the proxy endpoint
    #[command(alias = "p")]
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Run a simulated scan against a target
    #[command(alias = "s")]
    Scan {
        kind: ScanKind,
        #[arg(short, long)]
        target: String,
        /// Scan option as key=value, see `kalium catalog`
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Show the dashboard stat cards
    #[command(alias = "d")]
    Dashboard {
        /// Keep refreshing until interrupted
        #[arg(short, long)]
        watch: bool,
    },
    /// List scan types and their options
    #[command(alias = "c")]
    Catalog,
    /// Sign in with the demo account
    #[command(alias = "l")]
    Login {
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(short, long, default_value = "")]
        password: String,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut cfg = Config {
            shodan_api_key: self.shodan_key.clone(),
            urlscan_api_key: self.urlscan_key.clone(),
            quiet: self.quiet,
            ..Config::default()
        };
        if let Some(url) = &self.shodan_url {
            cfg.shodan_base_url = url.clone();
        }
        if let Some(url) = &self.urlscan_url {
            cfg.urlscan_base_url = url.clone();
        }
        if self.no_delay {
            cfg.step_delay = std::time::Duration::ZERO;
        }
        cfg
    }
}

/// Builds the client, either against `proxy_url` or an in-process proxy.
pub fn data_client(cfg: &Arc<Config>, proxy_url: Option<&str>) -> Arc<DataFetchClient> {
    let transport: Arc<dyn ProxyTransport> = match proxy_url {
        Some(url) => {
            debug!(%url, "Using remote proxy");
            Arc::new(HttpTransport::new(url))
        }
        None => Arc::new(LocalTransport::new(Arc::new(ProxyService::with_http(
            cfg.clone(),
        )))),
    };
    Arc::new(DataFetchClient::new(transport))
}

/// Cancels `token` on the first Ctrl+C.
pub fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    info!("Interrupt received, stopping");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Could not listen for Ctrl+C"),
            },
            _ = token.cancelled() => {}
        }
    });
}
