use anyhow::{Context, Result, ensure};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a reduction run. Everything the run needs is carried
/// here or on the command line; nothing is looked up relative to the process
/// working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level for application logging (e.g., "info", "debug", "warn")
    pub log_level: String,
    /// Directory holding the simulator's log CSVs
    pub logs_dir: PathBuf,
    /// Directory the derived data CSVs are written to
    pub data_out_dir: PathBuf,
    /// Default window width in nanoseconds for interval reductions
    pub interval_ns: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            logs_dir: PathBuf::from("logs_ns3"),
            data_out_dir: PathBuf::from("data"),
            interval_ns: 1_000_000_000,
        }
    }
}

impl Settings {
    /// Load configuration from a specific config file path.
    /// Environment variables take priority over the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = defaults()?
            .add_source(File::with_name(&path.as_ref().to_string_lossy()))
            .add_source(env_source())
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from environment variables alone, falling back to
    /// the built-in defaults.
    pub fn from_env() -> Result<Self> {
        let settings: Settings = defaults()?
            .add_source(env_source())
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.interval_ns > 0,
            "interval_ns must be positive (got {})",
            self.interval_ns
        );
        Ok(())
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let defaults = Settings::default();
    let builder = ConfigBuilder::builder()
        .set_default("log_level", defaults.log_level)?
        .set_default("logs_dir", defaults.logs_dir.to_string_lossy().to_string())?
        .set_default(
            "data_out_dir",
            defaults.data_out_dir.to_string_lossy().to_string(),
        )?
        .set_default("interval_ns", defaults.interval_ns)?;
    Ok(builder)
}

fn env_source() -> Environment {
    Environment::with_prefix("SIMLOG")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.interval_ns, 1_000_000_000);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let settings = Settings {
            interval_ns: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
