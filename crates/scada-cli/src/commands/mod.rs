pub mod init;
pub mod snapshot;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use scada_core::ScadaConfig;

/// File name looked up in the working directory when no --config is given.
pub const DEFAULT_CONFIG_FILE: &str = "scada.toml";

/// Load an explicit config, else `./scada.toml` if present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScadaConfig> {
    if let Some(path) = path {
        return ScadaConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()));
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file() {
        debug!(path = %fallback.display(), "using config from working directory");
        return ScadaConfig::from_file(fallback)
            .with_context(|| format!("loading config from {}", fallback.display()));
    }

    Ok(ScadaConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[feed]\nalarm_count = 4\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.alarm_count(), 4);
    }

    #[test]
    fn explicit_config_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
