//! Persisted application preferences.
//!
//! Settings live in one pretty-printed JSON file. A missing or unreadable
//! file falls back to defaults so startup never fails on preferences.

use crate::logging::default_log_level;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Default database file name, resolved against the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "notehub.sqlite3";

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Database file; relative paths are resolved against the data directory.
    pub database_path: PathBuf,
    pub theme: Theme,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            theme: Theme::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl AppSettings {
    /// Resolves `database_path` against `data_dir` when it is relative.
    pub fn resolved_database_path(&self, data_dir: &Path) -> PathBuf {
        if self.database_path.is_absolute() {
            self.database_path.clone()
        } else {
            data_dir.join(&self.database_path)
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "settings file `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "failed to serialize settings: {err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings(path: &Path) -> AppSettings {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return AppSettings::default(),
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(
                "event=settings_load module=settings status=fallback error_code=settings_corrupt error={err}"
            );
            AppSettings::default()
        }
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
