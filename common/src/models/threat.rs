use serde::{Deserialize, Serialize};

/// Classification attached to every normalized threat record.
pub const THREAT_KIND_MALICIOUS: &str = "malicious";

/// One point of the threat chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatData {
    pub timestamp: String,
    pub count: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malicious: Option<bool>,
}

/// Sum of `count` across a threat series, shown on the "threats" stat card.
pub fn total_count(series: &[ThreatData]) -> u64 {
    series.iter().map(|t| t.count).sum()
}
