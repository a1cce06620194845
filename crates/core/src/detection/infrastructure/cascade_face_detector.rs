use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::domain::face_detector::{DetectError, FaceDetector};
use crate::detection::domain::neighbor_grouping::group_rectangles;
use crate::shared::constants::GROUP_EPS;
use crate::shared::frame::Frame;
use crate::shared::rectangle::Rectangle;

use super::haar_cascade::{HaarCascade, ScanParams};

/// Haar-cascade face classifier: luma conversion, multi-scale window scan,
/// then neighbor grouping of the raw hits.
///
/// Holds no per-scan state, so one instance serves concurrent callers.
pub struct CascadeFaceDetector {
    cascade: HaarCascade,
    params: ScanParams,
    min_neighbor_groups: u32,
}

impl CascadeFaceDetector {
    pub fn new(cascade: HaarCascade, config: &DetectorConfig) -> Self {
        Self {
            cascade,
            params: ScanParams {
                scale_factor: config.scale_factor,
                min_width: config.min_window_width,
                min_height: config.min_window_height,
            },
            min_neighbor_groups: config.min_neighbor_groups,
        }
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<Rectangle>, DetectError> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }
        let rgb = frame
            .to_rgb_image()
            .ok_or("frame buffer does not match its dimensions")?;
        let gray = image::imageops::grayscale(&rgb);

        let hits = self.cascade.scan(&gray, &self.params);
        let faces = group_rectangles(&hits, self.min_neighbor_groups, GROUP_EPS);
        log::trace!(
            "{}x{} crop: {} raw hits, {} faces",
            frame.width(),
            frame.height(),
            hits.len(),
            faces.len()
        );
        Ok(faces)
    }
}
