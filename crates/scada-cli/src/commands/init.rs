//! `scada init` — write a scaffold scada.toml.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use scada_core::ScadaConfig;

use super::DEFAULT_CONFIG_FILE;

pub fn init(path: &str) -> Result<()> {
    let output = scaffold(Path::new(path))?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

/// Write the scaffold into `dir`, refusing to clobber an existing file.
pub fn scaffold(dir: &Path) -> Result<std::path::PathBuf> {
    let output = dir.join(DEFAULT_CONFIG_FILE);
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let text = ScadaConfig::scaffold().to_toml_string()?;
    std::fs::write(&output, text)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(path = %output.display(), "config scaffold written");
    Ok(output)
}
