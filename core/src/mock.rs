//! # Mock Feeds
//!
//! Synthetic payloads shaped like the upstream responses, served whenever
//! upstream credentials are missing or an upstream request fails.
//!
//! Values are randomized on every call; only the JSON shape is stable.

use chrono::{Local, TimeDelta};
use kalium_common::models::endpoint::Endpoint;
use kalium_common::models::threat::THREAT_KIND_MALICIOUS;
use kalium_common::utils::clock;
use rand::Rng;
use serde_json::{Value, json};

/// Number of points in the mock activity and threat series.
pub const MOCK_DATASET_LEN: usize = 12;
/// Spacing between consecutive mock points, in minutes.
pub const MOCK_STEP_MINUTES: i64 = 5;
pub const MOCK_PRODUCTS: [&str; 3] = ["Apache", "Nginx", "IIS"];
pub const MOCK_CVE: &str = "CVE-2023-1234";
pub const MOCK_DOMAIN: &str = "example.com";

/// Probability that a mock activity point carries a vulnerability.
const VULN_PROBABILITY: f64 = 0.3;

/// Full mock payload for `endpoint`.
pub fn payload(endpoint: Endpoint, target: Option<&str>) -> Value {
    match endpoint {
        Endpoint::Scans => scans(),
        Endpoint::Sources => sources(),
        Endpoint::Activity => activity(),
        Endpoint::Threats => threats(target),
    }
}

/// Payload served after an upstream failure.
///
/// Activity and threat series are the bare dataset, without the per-point
/// service and verdict details.
pub fn fallback(endpoint: Endpoint) -> Value {
    match endpoint {
        Endpoint::Scans => scans(),
        Endpoint::Sources => sources(),
        Endpoint::Activity => json!({ "matches": activity_dataset() }),
        Endpoint::Threats => json!({ "results": threat_dataset() }),
    }
}

/// `{"total": n}` with `n` in `100..=1099`.
pub fn scans() -> Value {
    let total: u64 = rand::rng().random_range(100..1100);
    json!({ "total": total })
}

/// A placeholder array whose length (5..=24) is the data source count.
pub fn sources() -> Value {
    let len: usize = rand::rng().random_range(5..25);
    Value::Array(vec![Value::Null; len])
}

pub fn activity() -> Value {
    let mut rng = rand::rng();
    let matches: Vec<Value> = activity_dataset()
        .into_iter()
        .map(|mut point| {
            let port: u16 = rng.random_range(1..=1000);
            let product = MOCK_PRODUCTS[rng.random_range(0..MOCK_PRODUCTS.len())];
            let version = format!(
                "{}.{}",
                rng.random_range(0..5u8),
                rng.random_range(0..10u8)
            );

            point["port"] = json!(port);
            point["product"] = json!(product);
            point["version"] = json!(version);
            if rng.random_bool(VULN_PROBABILITY) {
                let cvss = format!("{:.1}", rng.random_range(0.0..10.0));
                point["vulns"] = json!({
                    (MOCK_CVE): {
                        "summary": "Remote Code Execution Vulnerability",
                        "cvss": cvss,
                    }
                });
            }
            point
        })
        .collect();

    json!({ "matches": matches })
}

pub fn threats(target: Option<&str>) -> Value {
    let domain = target.filter(|t| !t.is_empty()).unwrap_or(MOCK_DOMAIN);
    let mut rng = rand::rng();
    let results: Vec<Value> = threat_dataset()
        .into_iter()
        .map(|mut point| {
            let malicious: u8 = rng.random_range(0..5);
            let suspicious: u8 = rng.random_range(0..10);
            let score: u8 = rng.random_range(0..100);

            point["page"] = json!({ "domain": domain });
            point["stats"] = json!({ "malicious": malicious, "suspicious": suspicious });
            point["verdicts"] = json!({
                "overall": { "score": score, "malicious": rng.random_bool(VULN_PROBABILITY) }
            });
            point
        })
        .collect();

    json!({ "results": results })
}

/// Base activity series: `{timestamp, value}` with `value` in `1..=10`.
pub fn activity_dataset() -> Vec<Value> {
    let mut rng = rand::rng();
    dataset_labels()
        .into_iter()
        .map(|timestamp| {
            let value: u8 = rng.random_range(1..=10);
            json!({ "timestamp": timestamp, "value": value })
        })
        .collect()
}

/// Base threat series: `{timestamp, count, type}` with `count` in `0..=4`.
pub fn threat_dataset() -> Vec<Value> {
    let mut rng = rand::rng();
    dataset_labels()
        .into_iter()
        .map(|timestamp| {
            let count: u8 = rng.random_range(0..5);
            json!({ "timestamp": timestamp, "count": count, "type": THREAT_KIND_MALICIOUS })
        })
        .collect()
}

fn dataset_labels() -> Vec<String> {
    clock::trailing_labels(
        Local::now(),
        MOCK_DATASET_LEN,
        TimeDelta::minutes(MOCK_STEP_MINUTES),
    )
}
