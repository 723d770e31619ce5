//! Show or initialize the configuration file.

use std::path::PathBuf;

use focustrain_common::config::{config_file_path, AppConfig};

/// Print the effective configuration as JSON.
pub fn show(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Write the default configuration to `path` (or the standard location).
pub fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let target = path.clone().unwrap_or_else(config_file_path);
    if target.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            target.display()
        );
    }
    let config = AppConfig::default();
    let written = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Wrote default configuration to {}", written.display());
    Ok(())
}
