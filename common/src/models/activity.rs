use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One point of the system activity chart, optionally carrying what the
/// host index reported for the matching service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemActivity {
    pub timestamp: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulns: Option<BTreeMap<String, Vulnerability>>,
}

/// A vulnerability entry keyed by CVE id in [`SystemActivity::vulns`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub summary: String,
    /// Upstream sends a number, mock data a string such as `"7.5"`.
    #[serde(default, deserialize_with = "number_or_string")]
    pub cvss: Option<f64>,
}

impl Vulnerability {
    pub fn cvss_label(&self) -> String {
        match self.cvss {
            Some(score) => format!("{score:.1}"),
            None => "n/a".to_string(),
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cvss_accepts_string_and_number() {
        let from_str: Vulnerability =
            serde_json::from_value(json!({"summary": "RCE", "cvss": "7.5"})).unwrap();
        let from_num: Vulnerability =
            serde_json::from_value(json!({"summary": "RCE", "cvss": 7.5})).unwrap();
        assert_eq!(from_str.cvss, Some(7.5));
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_cvss_garbage_is_none() {
        let vuln: Vulnerability = serde_json::from_value(json!({"cvss": "high"})).unwrap();
        assert_eq!(vuln.cvss, None);
        assert_eq!(vuln.cvss_label(), "n/a");
    }

    #[test]
    fn test_optional_fields_are_skipped() {
        let point = SystemActivity {
            timestamp: "10:00".to_string(),
            value: 3.0,
            port: None,
            product: None,
            version: None,
            vulns: None,
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value, json!({"timestamp": "10:00", "value": 3.0}));
    }
}
