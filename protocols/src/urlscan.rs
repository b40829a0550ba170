//! URL/domain reputation index (urlscan) requests and search results.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const SEARCH_PATH: &str = "/api/v1/search/";
pub const API_KEY_HEADER: &str = "API-Key";
/// Results requested per search, matching the chart width.
pub const PAGE_SIZE: usize = 12;
pub const DEFAULT_DOMAIN: &str = "*.com";

pub fn domain_query(target: Option<&str>) -> String {
    let domain = target.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_DOMAIN);
    format!("domain:{domain}")
}

pub fn search_url(base: &str, query: &str) -> String {
    format!(
        "{}?q={}&size={PAGE_SIZE}",
        super::join(base, SEARCH_PATH),
        urlencoding::encode(query)
    )
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    #[serde(deserialize_with = "crate::lenient")]
    pub domain: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(deserialize_with = "crate::lenient_or_default")]
    pub malicious: u64,
    #[serde(deserialize_with = "crate::lenient_or_default")]
    pub suspicious: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Verdict {
    #[serde(deserialize_with = "crate::lenient")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "crate::lenient_or_default")]
    pub malicious: bool,
}

/// The fields of a search result the dashboard reads.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    #[serde(deserialize_with = "crate::lenient")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "crate::lenient")]
    pub count: Option<u64>,
    #[serde(deserialize_with = "crate::lenient")]
    pub page: Option<PageInfo>,
    #[serde(deserialize_with = "crate::lenient")]
    pub stats: Option<Stats>,
    /// `verdicts.overall`, when present.
    #[serde(rename = "verdicts", deserialize_with = "overall_verdict")]
    pub verdict: Option<Verdict>,
}

impl SearchResult {
    pub fn from_value(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }
}

fn overall_verdict<'de, D>(deserializer: D) -> Result<Option<Verdict>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .get("overall")
        .filter(|o| o.is_object())
        .and_then(|o| Verdict::deserialize(o).ok()))
}

/// Extracts `results` from a search response, `None` if it is not an array.
pub fn results(body: &Value) -> Option<Vec<SearchResult>> {
    body.get("results")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(SearchResult::from_value).collect())
}
