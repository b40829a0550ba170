//! # Models
//!
//! * [`activity::SystemActivity`] and [`threat::ThreatData`]: normalized dashboard feed records.
//! * [`endpoint::Endpoint`]: the four feeds the proxy serves.
//! * [`progress::ScanProgress`]: one event of a simulated scan.
//! * [`scan::ScanConfig`]: the static catalog of scan types and their fields.

pub mod activity;
pub mod endpoint;
pub mod progress;
pub mod scan;
pub mod threat;
