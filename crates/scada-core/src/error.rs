//! Error types for SCADA configuration.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating `scada.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("refresh period for {0} must be greater than zero")]
    ZeroPeriod(&'static str),

    #[error("refresh period for {field} must be at most {max_secs}s")]
    PeriodTooLong { field: &'static str, max_secs: u64 },

    #[error("anomaly probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
}
