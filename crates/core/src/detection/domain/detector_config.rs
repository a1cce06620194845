use std::path::PathBuf;

use thiserror::Error;

use crate::shared::constants::{
    APP_DIR_NAME, DEFAULT_MIN_NEIGHBOR_GROUPS, DEFAULT_MIN_WINDOW_HEIGHT,
    DEFAULT_MIN_WINDOW_WIDTH, DEFAULT_SCALE_FACTOR, RESOURCE_SUBDIR,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("scale factor must be a finite number greater than 1.0, got {0}")]
    InvalidScaleFactor(f64),
    #[error("minimum scan window must be at least 1x1, got {width}x{height}")]
    InvalidMinWindow { width: u32, height: u32 },
    #[error("resource path is empty")]
    EmptyResourcePath,
}

/// Startup parameters of the face classifier. Immutable once the detector
/// adapter has been built from it.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Directory holding the cascade file, or the cascade file itself.
    pub resource_path: PathBuf,
    /// Growth of the scan window between passes.
    pub scale_factor: f64,
    /// A grouped detection needs more than this many raw hits.
    pub min_neighbor_groups: u32,
    pub min_window_width: u32,
    pub min_window_height: u32,
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 1.0) {
            return Err(ConfigError::InvalidScaleFactor(self.scale_factor));
        }
        if self.min_window_width == 0 || self.min_window_height == 0 {
            return Err(ConfigError::InvalidMinWindow {
                width: self.min_window_width,
                height: self.min_window_height,
            });
        }
        if self.resource_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyResourcePath);
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            resource_path: default_resource_dir(),
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbor_groups: DEFAULT_MIN_NEIGHBOR_GROUPS,
            min_window_width: DEFAULT_MIN_WINDOW_WIDTH,
            min_window_height: DEFAULT_MIN_WINDOW_HEIGHT,
        }
    }
}

/// Packaged location of the classifier data.
///
/// - macOS: `~/Library/Application Support/HeadFace/cascades/`
/// - Linux: `$XDG_DATA_HOME/HeadFace/cascades/` or `~/.local/share/HeadFace/cascades/`
/// - Windows: `%APPDATA%/HeadFace/cascades/`
///
/// Falls back to a relative `cascades/` when no data directory is known.
pub fn default_resource_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME).join(RESOURCE_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(RESOURCE_SUBDIR))
}
