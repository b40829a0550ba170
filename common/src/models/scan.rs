//! # Scan Catalog
//!
//! The fixed set of scan types the dashboard offers, each with the
//! configuration fields its form asks for.
//!
//! A [`ScanConfig`] is static data. User input is resolved against it with
//! [`ScanConfig::resolve`], which overlays `key=value` assignments on top of
//! the field defaults and validates the result into [`ScanParams`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParamError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    Quick,
    Full,
    Ports,
    Web,
    Malware,
}

impl ScanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::Quick => "quick",
            ScanKind::Full => "full",
            ScanKind::Ports => "ports",
            ScanKind::Web => "web",
            ScanKind::Malware => "malware",
        }
    }

    /// Scan types that also query the URL reputation index.
    pub fn checks_reputation(&self) -> bool {
        matches!(self, ScanKind::Web | ScanKind::Full | ScanKind::Malware)
    }

    pub fn config(&self) -> &'static ScanConfig {
        match self {
            ScanKind::Quick => &CATALOG[0],
            ScanKind::Full => &CATALOG[1],
            ScanKind::Ports => &CATALOG[2],
            ScanKind::Web => &CATALOG[3],
            ScanKind::Malware => &CATALOG[4],
        }
    }
}

impl FromStr for ScanKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(ScanKind::Quick),
            "full" => Ok(ScanKind::Full),
            "ports" => Ok(ScanKind::Ports),
            "web" => Ok(ScanKind::Web),
            "malware" => Ok(ScanKind::Malware),
            _ => Err(ParamError::UnknownScanType(s.to_string())),
        }
    }
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Select,
    Range,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Range)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(&'static str),
    Number(i64),
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ConfigField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub placeholder: Option<&'static str>,
    pub options: &'static [SelectOption],
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

impl ConfigField {
    const fn text(id: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::Text,
            placeholder: Some(placeholder),
            options: &[],
            min: None,
            max: None,
            required: true,
            default: None,
        }
    }

    const fn select(
        id: &'static str,
        label: &'static str,
        options: &'static [SelectOption],
        default: &'static str,
    ) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::Select,
            placeholder: None,
            options,
            min: None,
            max: None,
            required: false,
            default: Some(DefaultValue::Text(default)),
        }
    }

    const fn numeric(
        id: &'static str,
        label: &'static str,
        kind: FieldKind,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self {
            id,
            label,
            kind,
            placeholder: None,
            options: &[],
            min: Some(min),
            max: Some(max),
            required: false,
            default: Some(DefaultValue::Number(default)),
        }
    }

    fn parse(&self, raw: &str) -> Result<ParamValue, ParamError> {
        let raw = raw.trim();
        match self.kind {
            FieldKind::Text => Ok(ParamValue::Text(raw.to_string())),
            FieldKind::Select => {
                if self.options.iter().any(|o| o.value == raw) {
                    Ok(ParamValue::Text(raw.to_string()))
                } else {
                    Err(ParamError::InvalidOption {
                        field: self.id,
                        value: raw.to_string(),
                    })
                }
            }
            FieldKind::Number | FieldKind::Range => raw
                .parse::<i64>()
                .map(ParamValue::Number)
                .map_err(|_| ParamError::NotANumber {
                    field: self.id,
                    value: raw.to_string(),
                }),
        }
    }

    fn check(&self, value: Option<&ParamValue>) -> Result<(), ParamError> {
        match value {
            None => {
                if self.required {
                    return Err(ParamError::MissingRequired(self.id));
                }
            }
            Some(ParamValue::Text(text)) => {
                if self.required && text.is_empty() {
                    return Err(ParamError::MissingRequired(self.id));
                }
            }
            Some(ParamValue::Number(n)) => {
                let min = self.min.unwrap_or(i64::MIN);
                let max = self.max.unwrap_or(i64::MAX);
                if *n < min || *n > max {
                    return Err(ParamError::OutOfRange {
                        field: self.id,
                        min,
                        max,
                        value: *n,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A scan type as shown in the dashboard's scan selector.
#[derive(Debug, Serialize)]
pub struct ScanConfig {
    pub kind: ScanKind,
    pub label: &'static str,
    pub description: &'static str,
    pub fields: &'static [ConfigField],
}

impl ScanConfig {
    pub fn field(&self, id: &str) -> Option<&ConfigField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Field defaults with no user input applied.
    pub fn defaults(&self) -> ScanParams {
        let values = self
            .fields
            .iter()
            .filter_map(|f| {
                let value = match f.default? {
                    DefaultValue::Text(t) => ParamValue::Text(t.to_string()),
                    DefaultValue::Number(n) => ParamValue::Number(n),
                };
                Some((f.id.to_string(), value))
            })
            .collect();
        ScanParams { values }
    }

    /// Overlays `assignments` on the defaults and validates every field.
    pub fn resolve<I, K, V>(&self, assignments: I) -> Result<ScanParams, ParamError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = self.defaults();

        for (key, raw) in assignments {
            let key = key.as_ref();
            let field = self.field(key).ok_or_else(|| ParamError::UnknownField {
                scan: self.kind.as_str(),
                field: key.to_string(),
            })?;
            params
                .values
                .insert(field.id.to_string(), field.parse(raw.as_ref())?);
        }

        for field in self.fields {
            field.check(params.values.get(field.id))?;
        }

        Ok(params)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(t) => f.write_str(t),
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Validated configuration for one scan run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanParams {
    values: BTreeMap<String, ParamValue>,
}

impl ScanParams {
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.values.get(id)? {
            ParamValue::Text(t) => Some(t.as_str()),
            ParamValue::Number(_) => None,
        }
    }

    pub fn number(&self, id: &str) -> Option<i64> {
        match self.values.get(id)? {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(t) => t.parse().ok(),
        }
    }

    pub fn target(&self) -> &str {
        self.text("target").unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Splits a `key=value` command-line assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, String), ParamError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ParamError::MalformedAssignment(raw.to_string())),
    }
}

pub fn catalog() -> &'static [ScanConfig] {
    &CATALOG
}

const TARGET_HOST: ConfigField =
    ConfigField::text("target", "Target IP/Domain", "e.g., example.com or 192.168.1.1");

static CATALOG: [ScanConfig; 5] = [
    ScanConfig {
        kind: ScanKind::Quick,
        label: "Quick Scan",
        description: "Basic vulnerability scan",
        fields: &[
            TARGET_HOST,
            ConfigField::select(
                "intensity",
                "Scan Intensity",
                &[
                    SelectOption { value: "low", label: "Low" },
                    SelectOption { value: "medium", label: "Medium" },
                    SelectOption { value: "high", label: "High" },
                ],
                "medium",
            ),
        ],
    },
    ScanConfig {
        kind: ScanKind::Full,
        label: "Full Scan",
        description: "Comprehensive security analysis",
        fields: &[
            TARGET_HOST,
            ConfigField::numeric("depth", "Scan Depth", FieldKind::Range, 1, 5, 3),
            ConfigField::numeric("timeout", "Timeout (seconds)", FieldKind::Number, 30, 300, 60),
        ],
    },
    ScanConfig {
        kind: ScanKind::Ports,
        label: "Port Scan",
        description: "Network port enumeration",
        fields: &[
            TARGET_HOST,
            ConfigField::select(
                "portRange",
                "Port Range",
                &[
                    SelectOption { value: "common", label: "Common Ports (1-1024)" },
                    SelectOption { value: "extended", label: "Extended (1-10000)" },
                    SelectOption { value: "full", label: "Full Range (1-65535)" },
                ],
                "common",
            ),
            ConfigField::select(
                "scanType",
                "Scan Type",
                &[
                    SelectOption { value: "tcp", label: "TCP" },
                    SelectOption { value: "udp", label: "UDP" },
                    SelectOption { value: "both", label: "TCP & UDP" },
                ],
                "tcp",
            ),
        ],
    },
    ScanConfig {
        kind: ScanKind::Web,
        label: "Web Scan",
        description: "Web application vulnerabilities",
        fields: &[
            ConfigField::text("target", "Target URL", "https://example.com"),
            ConfigField::numeric("crawlDepth", "Crawl Depth", FieldKind::Number, 1, 10, 3),
            ConfigField::select(
                "scanTypes",
                "Scan Types",
                &[
                    SelectOption { value: "xss", label: "XSS Vulnerabilities" },
                    SelectOption { value: "sqli", label: "SQL Injection" },
                    SelectOption { value: "all", label: "All Vulnerabilities" },
                ],
                "all",
            ),
        ],
    },
    ScanConfig {
        kind: ScanKind::Malware,
        label: "Malware Scan",
        description: "Malware detection scan",
        fields: &[
            ConfigField::text("target", "Target URL/File", "URL or file path"),
            ConfigField::select(
                "engineType",
                "Scan Engine",
                &[
                    SelectOption { value: "quick", label: "Quick Scan" },
                    SelectOption { value: "deep", label: "Deep Analysis" },
                    SelectOption { value: "heuristic", label: "Heuristic Detection" },
                ],
                "quick",
            ),
        ],
    },
];
