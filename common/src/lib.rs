//! # Kalium Common
//!
//! Types shared by every crate in the workspace.
//!
//! * **[`config`]**: the runtime configuration injected into services at startup.
//! * **[`models`]**: the records that flow between the proxy, the client and the scanner.
//! * **[`error`]**: parse and validation errors for user-supplied values.
//! * **[`utils`]**: small helpers (clock labels).

pub mod config;
pub mod error;
pub mod models;
pub mod utils;
