//! Application configuration for conftrack.
//!
//! User config lives at `~/.conftrack/conftrack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConftrackError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "conftrack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".conftrack";

// ---------------------------------------------------------------------------
// Config structs (matching conftrack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Presentation settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the conference listings page to scrape.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
        }
    }
}

fn default_listing_url() -> String {
    "https://www.conference-service.com/conferences/gravitation-and-cosmology.html".into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the local conference database. `~` expands to the home dir.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.conftrack/conferences.db".into()
}

/// `[display]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum display width for titles before truncation.
    #[serde(default = "default_title_width")]
    pub title_width: usize,

    /// Records added within this many hours are flagged as new.
    #[serde(default = "default_recency_hours")]
    pub recency_hours: i64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title_width: default_title_width(),
            recency_hours: default_recency_hours(),
        }
    }
}

fn default_title_width() -> usize {
    40
}
fn default_recency_hours() -> i64 {
    24
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.conftrack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ConftrackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.conftrack/conftrack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConftrackError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ConftrackError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ConftrackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ConftrackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConftrackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

impl AppConfig {
    /// Resolve the configured database path, expanding a leading `~`.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        let raw = &self.storage.db_path;
        if let Some(rest) = raw.strip_prefix("~/") {
            let home = dirs::home_dir()
                .ok_or_else(|| ConftrackError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        } else {
            Ok(PathBuf::from(raw))
        }
    }
}
