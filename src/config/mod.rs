//! # Configuration Management
//!
//! Locates, loads and writes the YAML configuration file.
//!
//! The file is looked up in this order:
//! 1. an explicit path (the `--config` flag)
//! 2. `$TC_CONFIG_PATH/config.yaml`
//! 3. `config.yaml` next to the running executable
//!
//! A missing file is created with defaults on first load.

pub mod settings;

pub use settings::{
    AwsConfig, AzureConfig, BackendSelection, Config, GcpConfig, HashiVaultConfig, LoggingConfig,
    DEFAULT_TIMEOUT_SECONDS,
};

use crate::errors::{CredsError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the directory that holds `config.yaml`.
pub const CONFIG_DIR_ENV: &str = "TC_CONFIG_PATH";

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the configuration file location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir).join(CONFIG_FILE_NAME));
    }

    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| CredsError::config("Unable to determine the executable directory"))?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load configuration from `path`, writing a default file if none exists.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Configuration file not found, creating defaults");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        Self::load(path)
    }

    /// Load configuration from an existing file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| {
            CredsError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| CredsError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, yaml)?;

        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.yaml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.select_backend(BackendSelection::Aws(AwsConfig {
            description: "terraform tokens".into(),
            region: "us-east-1".into(),
            secret_name: String::new(),
        }));
        config.secrets = vec!["a".into(), "b".into()];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_empty_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "logging: [unterminated").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, CredsError::Config { .. }));
    }
}
