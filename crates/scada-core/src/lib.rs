//! scada-core — shared domain types and configuration for the SCADA feed.
//!
//! Every screen of the dashboard reads ephemeral, in-memory records:
//! alarms, machines, a pipeline reading, and an energy forecast series.
//! This crate defines those records, the static pipeline topology, the
//! screen catalogue with its refresh periods, and the `scada.toml` parser.

pub mod config;
pub mod error;
pub mod types;

pub use config::ScadaConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
