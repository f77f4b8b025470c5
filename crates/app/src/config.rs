//! Application configuration
//!
//! Optional TOML file controlling where the store lives and how long
//! gateway sessions last. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use hearth_core::{Error, Result, DEFAULT_SESSION_HOURS};

/// Settings loaded from `hearth.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Override for the data directory (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
    /// Session lifetime in hours
    pub session_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Validation(format!("invalid config: {e}")))
    }

    /// Load from `path` when the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the database path, creating the directory when needed
    pub fn database_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("dev", "hearth", "hearth")
                .ok_or_else(|| {
                    Error::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "Could not determine data directory",
                    ))
                })?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir.join("hearth.db"))
    }
}
