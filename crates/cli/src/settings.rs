use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use headface_core::detection::domain::detector_config::DetectorConfig;
use headface_core::shared::constants::APP_DIR_NAME;

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("batch timeout must be positive")]
    ZeroTimeout,
}

/// One layer of node settings. Unset fields fall through to the layer
/// below; the bottom layer is [`DetectorConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub resource_path: Option<PathBuf>,
    pub scale_factor: Option<f64>,
    pub min_neighbor_groups: Option<u32>,
    pub min_window_width: Option<u32>,
    pub min_window_height: Option<u32>,
    pub batch_timeout_ms: Option<u64>,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Reads the settings file at `explicit`, or the per-user one if it
    /// exists. A missing per-user file is not an error; a missing explicit
    /// one is.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns `self` with every field that `upper` sets replaced.
    pub fn overlay(self, upper: Settings) -> Settings {
        Settings {
            resource_path: upper.resource_path.or(self.resource_path),
            scale_factor: upper.scale_factor.or(self.scale_factor),
            min_neighbor_groups: upper.min_neighbor_groups.or(self.min_neighbor_groups),
            min_window_width: upper.min_window_width.or(self.min_window_width),
            min_window_height: upper.min_window_height.or(self.min_window_height),
            batch_timeout_ms: upper.batch_timeout_ms.or(self.batch_timeout_ms),
        }
    }

    /// Range checks happen when the detector is initialized.
    pub fn detector_config(&self) -> DetectorConfig {
        let defaults = DetectorConfig::default();
        DetectorConfig {
            resource_path: self.resource_path.clone().unwrap_or(defaults.resource_path),
            scale_factor: self.scale_factor.unwrap_or(defaults.scale_factor),
            min_neighbor_groups: self.min_neighbor_groups.unwrap_or(defaults.min_neighbor_groups),
            min_window_width: self.min_window_width.unwrap_or(defaults.min_window_width),
            min_window_height: self.min_window_height.unwrap_or(defaults.min_window_height),
        }
    }

    pub fn batch_timeout(&self) -> Result<Option<Duration>, SettingsError> {
        match self.batch_timeout_ms {
            Some(0) => Err(SettingsError::ZeroTimeout),
            Some(ms) => Ok(Some(Duration::from_millis(ms))),
            None => Ok(None),
        }
    }
}
