//! Configuration loading and config directory resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "FONTSOURCE_CONFIG_DIR";

/// Overrides the location of the TOML config file
pub const CONFIG_FILE_ENV: &str = "FONTSOURCE_CONFIG";

/// Default ceiling on in-flight asset transfers
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 12;

/// Bootstrap configuration loaded from TOML
///
/// Every key is optional; missing keys fall back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Host configuration directory (stylesheets and settings live here)
    pub config_dir: Option<PathBuf>,

    /// Catalog API root (metadata and font list)
    pub api_base_url: String,

    /// CDN root serving `.woff2` assets
    pub cdn_base_url: String,

    /// Worker pool ceiling shared by all imports
    pub max_concurrent_downloads: usize,

    /// Per-request transport timeout
    pub request_timeout_secs: u64,

    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter (trace, debug, info, warn, error) when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            api_base_url: "https://api.fontsource.org".to_string(),
            cdn_base_url: "https://cdn.jsdelivr.net/fontsource".to_string(),
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            request_timeout_secs: 30,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Load from the default location
    ///
    /// A missing file is not an error: defaults are used and a warning logged.
    pub fn load() -> Result<Self> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config file location, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_downloads == 0 {
            return Err(Error::Config(
                "max_concurrent_downloads must be at least 1".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() || self.cdn_base_url.trim().is_empty() {
            return Err(Error::Config("base URLs must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Config directory resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default
pub fn resolve_config_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.config_dir {
        return path.clone();
    }

    default_config_dir()
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("fontsource").join("config.toml"))
}

/// OS-dependent default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("fontsource"))
        .unwrap_or_else(|| PathBuf::from("./fontsource"))
}

/// File locations derived from the configuration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontsourcePaths {
    config_dir: PathBuf,
}

impl FontsourcePaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory holding one `{id}.css` per imported font
    pub fn fonts_dir(&self) -> PathBuf {
        self.config_dir.join("fonts")
    }

    pub fn stylesheet_path(&self, id: &str) -> PathBuf {
        self.fonts_dir().join(format!("{}.css", id))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("fontsource.json")
    }

    /// Default output of the combined applied stylesheet
    pub fn applied_stylesheet_path(&self) -> PathBuf {
        self.config_dir.join("fontsource-applied.css")
    }
}
