//! # Kalium Core
//!
//! Services behind the dashboard:
//!
//! * **[`proxy`]** and **[`server`]**: the `/api/proxy` endpoint, answering from
//!   the upstream indexes or from [`mock`] data.
//! * **[`client`]**: typed reads over that endpoint.
//! * **[`scanner`]**: the simulated multi-phase scan.
//! * **[`dashboard`]**: periodic stat snapshots.
//! * **[`auth`]**: the demo login gate.

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod mock;
pub mod proxy;
pub mod scanner;
pub mod server;
pub mod upstream;
