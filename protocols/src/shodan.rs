//! Host/service index (Shodan) requests and match records.

use std::collections::BTreeMap;

use kalium_common::models::activity::Vulnerability;
use kalium_common::models::scan::{ScanKind, ScanParams};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const HOST_COUNT_PATH: &str = "/shodan/host/count";
pub const PORTS_PATH: &str = "/shodan/ports";
pub const HOST_SEARCH_PATH: &str = "/shodan/host/search";

/// Query behind the "total scans" stat card.
pub const SCAN_COUNT_QUERY: &str = "port:22,80,443";
/// Host search used when no target is given.
pub const DEFAULT_SEARCH_QUERY: &str = "port:80";

pub fn host_count_url(base: &str, key: &str) -> String {
    search_like(base, HOST_COUNT_PATH, key, SCAN_COUNT_QUERY)
}

pub fn ports_url(base: &str, key: &str) -> String {
    format!(
        "{}?key={}",
        super::join(base, PORTS_PATH),
        urlencoding::encode(key)
    )
}

pub fn host_search_url(base: &str, key: &str, query: &str) -> String {
    search_like(base, HOST_SEARCH_PATH, key, query)
}

fn search_like(base: &str, path: &str, key: &str, query: &str) -> String {
    format!(
        "{}?key={}&query={}",
        super::join(base, path),
        urlencoding::encode(key),
        urlencoding::encode(query)
    )
}

/// Host search query for the activity feed.
///
/// An explicit `query` wins, then `hostname:<target>`, then [`DEFAULT_SEARCH_QUERY`].
pub fn activity_query(target: Option<&str>, query: Option<&str>) -> String {
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        return q.to_string();
    }
    match target.filter(|t| !t.is_empty()) {
        Some(t) => format!("hostname:{t}"),
        None => DEFAULT_SEARCH_QUERY.to_string(),
    }
}

/// Host search query a scan of `kind` issues for its configured target.
pub fn scan_query(kind: ScanKind, params: &ScanParams) -> String {
    let target = params.target();
    match kind {
        ScanKind::Quick => format!("hostname:{target} port:22,80,443"),
        ScanKind::Full => format!("hostname:{target}"),
        ScanKind::Ports => {
            let range = match params.text("portRange") {
                Some("extended") => "1-10000",
                Some("full") => "1-65535",
                _ => "1-1024",
            };
            let mut query = format!("hostname:{target} port:{range}");
            match params.text("scanType") {
                Some("both") => {}
                Some(transport) => query.push_str(&format!(" transport:{transport}")),
                None => {}
            }
            query
        }
        ScanKind::Web => {
            let mut query = format!("http.host:{target}");
            match params.text("scanTypes") {
                Some("all") | None => {}
                Some(class) => query.push_str(&format!(" vuln:{class}")),
            }
            query
        }
        ScanKind::Malware => format!("hostname:{target} malware:*"),
    }
}

/// The fields of a host search match the dashboard reads.
///
/// Every field is optional; values of the wrong JSON type are dropped
/// instead of failing the whole record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostMatch {
    #[serde(deserialize_with = "crate::lenient")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "crate::lenient")]
    pub value: Option<f64>,
    #[serde(deserialize_with = "crate::lenient")]
    pub port: Option<u16>,
    #[serde(deserialize_with = "crate::lenient")]
    pub product: Option<String>,
    #[serde(deserialize_with = "crate::lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "vulns_by_id")]
    pub vulns: Option<BTreeMap<String, Vulnerability>>,
}

impl HostMatch {
    pub fn from_value(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }
}

/// Keeps every CVE id even when its details are unreadable.
fn vulns_by_id<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, Vulnerability>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_object().map(|map| {
        map.iter()
            .map(|(id, details)| (id.clone(), Vulnerability::deserialize(details).unwrap_or_default()))
            .collect()
    }))
}

/// Extracts `matches` from a host search response, `None` if it is not an array.
pub fn matches(body: &Value) -> Option<Vec<HostMatch>> {
    body.get("matches")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(HostMatch::from_value).collect())
}

/// Distinct ports in first-seen order.
pub fn distinct_ports(matches: &[HostMatch]) -> Vec<u16> {
    let mut seen = Vec::new();
    for port in matches.iter().filter_map(|m| m.port) {
        if !seen.contains(&port) {
            seen.push(port);
        }
    }
    seen
}
