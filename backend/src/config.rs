//! # Configuration
//!
//! Application settings read from a single YAML file.
//!
//! ## File Location
//!
//! `<platform config dir>/okeiko_sitter.yaml`. A missing file means defaults;
//! a file that cannot be parsed is an error.
//!
//! ## YAML Format
//!
//! ```yaml
//! data_directory: "/home/me/.local/share/OkeikoSitter"
//! collection: "users"
//! profile_image_quality: 80
//! max_profile_image_bytes: 5242880
//! log_level: "info"
//! ```
//!
//! Every key is optional. `OKEIKO_DATA_DIR` overrides `data_directory`.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "okeiko_sitter.yaml";
pub const DATA_DIR_ENV: &str = "OKEIKO_DATA_DIR";
const APP_DIRECTORY: &str = "OkeikoSitter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the file-backed document and blob store
    pub data_directory: PathBuf,
    /// Collection holding one document per account
    pub collection: String,
    /// JPEG quality of uploaded profile pictures, 1-100
    pub profile_image_quality: u8,
    /// Download limit for a single profile picture
    pub max_profile_image_bytes: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            collection: shared::USERS_COLLECTION.to_string(),
            profile_image_quality: 80,
            max_profile_image_bytes: 5 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIRECTORY)
}

impl AppConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, then apply the environment override
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                info!("Using data directory from {}", DATA_DIR_ENV);
                config.data_directory = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    /// Load a specific file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
