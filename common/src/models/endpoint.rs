use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EndpointError;

/// A dashboard feed served by the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Total scanned hosts, `{"total": n}`.
    Scans,
    /// Known data sources, a bare JSON array.
    Sources,
    /// Host-index matches, `{"matches": [...]}`.
    Activity,
    /// Reputation results, `{"results": [...]}`.
    Threats,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Scans,
        Endpoint::Sources,
        Endpoint::Activity,
        Endpoint::Threats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Scans => "scans",
            Endpoint::Sources => "sources",
            Endpoint::Activity => "activity",
            Endpoint::Threats => "threats",
        }
    }

    /// Parses the raw `endpoint` query parameter.
    pub fn from_param(param: Option<&str>) -> Result<Self, EndpointError> {
        match param {
            None | Some("") => Err(EndpointError::Missing),
            Some(raw) => raw.parse(),
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scans" => Ok(Endpoint::Scans),
            "sources" => Ok(Endpoint::Sources),
            "activity" => Ok(Endpoint::Activity),
            "threats" => Ok(Endpoint::Threats),
            other => Err(EndpointError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
