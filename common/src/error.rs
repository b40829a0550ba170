use thiserror::Error;

/// Rejected `endpoint` query values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("No endpoint specified")]
    Missing,
    #[error("Invalid endpoint")]
    Unknown(String),
}

/// Errors raised while resolving user-supplied scan parameters against the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("unknown scan type: {0}")]
    UnknownScanType(String),
    #[error("unknown field '{field}' for {scan} scan")]
    UnknownField { scan: &'static str, field: String },
    #[error("field '{0}' is required")]
    MissingRequired(&'static str),
    #[error("field '{field}' expects a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("field '{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("'{value}' is not a valid option for '{field}'")]
    InvalidOption { field: &'static str, value: String },
    #[error("malformed assignment '{0}', expected key=value")]
    MalformedAssignment(String),
}
