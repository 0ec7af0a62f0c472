//! User settings read from `settings.toml` in the platform config directory.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use welltab_core::{FillMethod, ImportOptions};
use welltab_engine::engine::TimeUnit;

pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Defaults for options that are not given on the command line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inputs with at least this many lines are flagged as large
    pub max_display_rows: usize,
    pub progress_interval: usize,
    pub time_unit: TimeUnit,
    pub outlier_threshold: f64,
    pub fill_method: FillMethod,
}

impl Default for Settings {
    fn default() -> Self {
        let import = ImportOptions::default();
        Settings {
            max_display_rows: import.max_display_rows,
            progress_interval: import.progress_interval,
            time_unit: TimeUnit::Hours,
            outlier_threshold: 3.0,
            fill_method: FillMethod::Interpolation,
        }
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "welltab")?;
    Some(proj.config_dir().join(SETTINGS_FILE))
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing default file gives the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Settings, SettingsError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_settings_path() {
                Some(path) => (path, false),
                None => return Ok(Settings::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            max_display_rows: self.max_display_rows,
            progress_interval: self.progress_interval.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "time_unit = \"m\"\nfill_method = \"forward\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.time_unit, TimeUnit::Minutes);
        assert_eq!(settings.fill_method, FillMethod::Forward);
        assert_eq!(settings.max_display_rows, 10_000);
        assert_eq!(settings.outlier_threshold, 3.0);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "outlier_threshold = \"high\"\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains(SETTINGS_FILE));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_import_options() {
        let settings = Settings {
            progress_interval: 0,
            ..Settings::default()
        };
        assert_eq!(settings.import_options().progress_interval, 1);
    }
}
