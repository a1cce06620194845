use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::detection::domain::detector_adapter::DetectorAdapter;
use crate::detection::domain::detector_config::{ConfigError, DetectorConfig};
use crate::shared::constants::CASCADE_FILE_NAME;

use super::cascade_face_detector::CascadeFaceDetector;
use super::haar_cascade::HaarCascade;
use super::resource_resolver::{self, ResourceError};

#[derive(Error, Debug)]
pub enum InitError {
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("classifier data unavailable at {path}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: ResourceError,
    },
}

/// Builds the process-wide detector adapter.
///
/// Validates the configuration, then loads the cascade from
/// `config.resource_path`. Any failure here is meant to stop the process
/// before it accepts batches.
pub fn init(config: DetectorConfig) -> Result<DetectorAdapter, InitError> {
    config.validate()?;

    let unavailable = |source: ResourceError| InitError::ResourceUnavailable {
        path: config.resource_path.clone(),
        source,
    };
    let cascade_path =
        resource_resolver::resolve(CASCADE_FILE_NAME, &config.resource_path).map_err(unavailable)?;
    let cascade = HaarCascade::load(&cascade_path)
        .map_err(|e| unavailable(ResourceError::Cascade(e)))?;

    log::info!(
        "Loaded face cascade from {} ({} stages, {}x{} window)",
        cascade_path.display(),
        cascade.stages.len(),
        cascade.window_width,
        cascade.window_height
    );
    log::info!(
        "Scan parameters: scale_factor={}, min_neighbor_groups={}, min_window={}x{}",
        config.scale_factor,
        config.min_neighbor_groups,
        config.min_window_width,
        config.min_window_height
    );

    let detector = CascadeFaceDetector::new(cascade, &config);
    Ok(DetectorAdapter::new(Arc::new(detector), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::infrastructure::haar_cascade::CascadeError;
    use crate::test_fixtures::{blank_image, edge_cascade_json, face_patch_image};
    use std::fs;
    use tempfile::TempDir;

    fn resource_dir_with(contents: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CASCADE_FILE_NAME), contents).unwrap();
        tmp
    }

    fn config(dir: &TempDir) -> DetectorConfig {
        DetectorConfig {
            resource_path: dir.path().to_path_buf(),
            min_neighbor_groups: 1,
            min_window_width: 8,
            min_window_height: 8,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn test_init_loads_cascade_and_detects() {
        let dir = resource_dir_with(&edge_cascade_json());
        let adapter = init(config(&dir)).unwrap();

        let faces = adapter.detect_all(&[
            face_patch_image(48, 48, 12, 12, 16),
            blank_image(48, 48),
        ]);

        assert_eq!(faces.len(), 2);
        assert!(!faces[0].is_empty());
        assert!(faces[1].is_empty());
        assert_eq!(adapter.config().min_neighbor_groups, 1);
    }

    #[test]
    fn test_missing_resource_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = init(config(&dir)).err().unwrap();
        assert!(matches!(
            err,
            InitError::ResourceUnavailable {
                source: ResourceError::NotFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unparseable_resource_is_unavailable() {
        let dir = resource_dir_with("not json");
        let err = init(config(&dir)).err().unwrap();
        assert!(matches!(
            err,
            InitError::ResourceUnavailable {
                source: ResourceError::Cascade(CascadeError::Parse { .. }),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_fails_before_loading() {
        let dir = TempDir::new().unwrap();
        let bad = DetectorConfig {
            scale_factor: 0.5,
            ..config(&dir)
        };
        let err = init(bad).err().unwrap();
        assert!(matches!(
            err,
            InitError::InvalidConfig(ConfigError::InvalidScaleFactor(_))
        ));
    }
}
