//! Shared building blocks for the cadence workspace.
//!
//! - `config`: settings loaded from defaults, the environment and `config.toml`
//! - `error`: the fatal error taxonomy shared by every reconciliation step
//! - `telemetry`: `tracing` subscriber bootstrap
//! - `types`: identifier newtypes for users, calendars and organizations

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;
