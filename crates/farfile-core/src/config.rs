//! Browser configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of buffered change notifications per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Default largest file the browser will read for preview (10 MiB).
pub const DEFAULT_PREVIEW_LIMIT: u64 = 10 * 1024 * 1024;

/// How the search text filters the visible entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring match on the entry name.
    #[default]
    Substring,
    /// Glob pattern match on the entry name (e.g. `*.jpg`).
    Glob,
}

impl SearchMode {
    /// Cycle to the next search mode.
    pub fn next(self) -> Self {
        match self {
            Self::Substring => Self::Glob,
            Self::Glob => Self::Substring,
        }
    }
}

/// Configuration for a file browser.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct BrowserConfig {
    /// Directory shown when the browser starts.
    #[builder(default = "default_home_path()")]
    pub home_path: String,

    /// Show entries whose name starts with a dot.
    #[builder(default = "true")]
    pub show_hidden: bool,

    /// Name of the parent-directory entry some devices report.
    #[builder(default = "default_parent_sentinel()")]
    pub parent_sentinel: String,

    /// Buffered change notifications per subscriber.
    #[builder(default = "DEFAULT_EVENT_CAPACITY")]
    pub event_capacity: usize,

    /// How search text is matched.
    #[builder(default)]
    pub search_mode: SearchMode,

    /// Largest file size read for preview, in bytes.
    #[builder(default = "DEFAULT_PREVIEW_LIMIT")]
    pub preview_limit: u64,
}

fn default_home_path() -> String {
    "/sdcard/".to_string()
}

fn default_parent_sentinel() -> String {
    "..".to_string()
}

fn check_home_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') || !path.ends_with('/') {
        return Err(format!(
            "home path must be absolute and end with '/': {path}"
        ));
    }
    Ok(())
}

impl BrowserConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref home) = self.home_path {
            check_home_path(home)?;
        }
        if self.event_capacity == Some(0) {
            return Err("event capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home_path: default_home_path(),
            show_hidden: true,
            parent_sentinel: default_parent_sentinel(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            search_mode: SearchMode::default(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder.
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("farfile").join("config.toml"))
    }

    /// Load config from the default location, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a TOML file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config as pretty TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Check values that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_home_path(&self.home_path).map_err(|message| ConfigError::Invalid { message })?;
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "event capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
