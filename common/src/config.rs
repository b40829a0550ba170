use std::time::Duration;

pub const DEFAULT_SHODAN_URL: &str = "https://api.shodan.io";
pub const DEFAULT_URLSCAN_URL: &str = "https://urlscan.io";
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the host/service index.
    ///
    /// Together with [`Config::urlscan_api_key`] this is the only switch
    /// between mock and upstream mode: if either key is missing or empty,
    /// the proxy never touches the network.
    pub shodan_api_key: Option<String>,
    /// API key for the URL/domain reputation index.
    pub urlscan_api_key: Option<String>,
    pub shodan_base_url: String,
    pub urlscan_base_url: String,
    /// Pause between staged scan phases.
    pub step_delay: Duration,
    /// Interval between dashboard refreshes.
    pub poll_interval: Duration,
    pub credentials: Credentials,
    /// Output verbosity reduction, 0 prints everything.
    pub quiet: u8,
}

/// The single account accepted by the login gate.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Borrowed view of both upstream keys, only available when both are set.
#[derive(Clone, Copy, Debug)]
pub struct UpstreamKeys<'a> {
    pub shodan: &'a str,
    pub urlscan: &'a str,
}

impl Config {
    /// Returns both upstream keys, or `None` when the proxy must answer with mock data.
    pub fn upstream_keys(&self) -> Option<UpstreamKeys<'_>> {
        let shodan = non_empty(self.shodan_api_key.as_deref())?;
        let urlscan = non_empty(self.urlscan_api_key.as_deref())?;
        Some(UpstreamKeys { shodan, urlscan })
    }

    pub fn is_mock_mode(&self) -> bool {
        self.upstream_keys().is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shodan_api_key: None,
            urlscan_api_key: None,
            shodan_base_url: DEFAULT_SHODAN_URL.to_string(),
            urlscan_base_url: DEFAULT_URLSCAN_URL.to_string(),
            step_delay: DEFAULT_STEP_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            credentials: Credentials::default(),
            quiet: 0,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
