use std::sync::Arc;

use rayon::prelude::*;

use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::rectangle::Rectangle;

/// Batch front of the face classifier.
///
/// Owns the one classifier instance of the process together with the
/// configuration it was built from. Both are read-only after construction, so
/// a single adapter can serve concurrent batches.
pub struct DetectorAdapter {
    detector: Arc<dyn FaceDetector>,
    config: DetectorConfig,
}

impl DetectorAdapter {
    pub fn new(detector: Arc<dyn FaceDetector>, config: DetectorConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Scans every image and returns one rectangle list per image, in input
    /// order.
    ///
    /// Images are scanned in parallel. A scan that fails is logged and
    /// reported as "no faces", the same as an image without faces.
    pub fn detect_all(&self, images: &[Frame]) -> Vec<Vec<Rectangle>> {
        if images.is_empty() {
            return Vec::new();
        }
        images
            .par_iter()
            .enumerate()
            .map(|(index, frame)| self.detect_one(index, frame))
            .collect()
    }

    fn detect_one(&self, index: usize, frame: &Frame) -> Vec<Rectangle> {
        match self.detector.detect(frame) {
            Ok(mut faces) => {
                let before = faces.len();
                faces.retain(Rectangle::is_well_formed);
                if faces.len() != before {
                    log::debug!(
                        "Image {index}: discarded {} malformed rectangles",
                        before - faces.len()
                    );
                }
                faces
            }
            Err(e) => {
                log::warn!("Face scan failed for image {index}: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::DetectError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns one face whose width encodes the image width.
    struct WidthEchoDetector {
        calls: AtomicUsize,
    }

    impl FaceDetector for WidthEchoDetector {
        fn detect(&self, frame: &Frame) -> Result<Vec<Rectangle>, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if frame.width() == 13 {
                return Err("corrupt buffer".into());
            }
            if frame.width() == 1 {
                return Ok(Vec::new());
            }
            Ok(vec![Rectangle::new(0, 0, frame.width() as i32, 1)])
        }
    }

    fn adapter() -> (DetectorAdapter, Arc<WidthEchoDetector>) {
        let detector = Arc::new(WidthEchoDetector {
            calls: AtomicUsize::new(0),
        });
        let adapter = DetectorAdapter::new(detector.clone(), DetectorConfig::default());
        (adapter, detector)
    }

    fn frame(width: u32) -> Frame {
        Frame::new(vec![0; width as usize * 3], width, 1)
    }

    #[test]
    fn test_empty_input_returns_empty_without_scanning() {
        let (adapter, detector) = adapter();
        assert!(adapter.detect_all(&[]).is_empty());
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_output_is_positional() {
        let (adapter, detector) = adapter();
        let widths: Vec<u32> = (2..40).collect();
        let frames: Vec<Frame> = widths.iter().map(|&w| frame(w)).collect();

        let result = adapter.detect_all(&frames);

        assert_eq!(result.len(), frames.len());
        for (w, faces) in widths.iter().zip(&result) {
            assert_eq!(faces, &vec![Rectangle::new(0, 0, *w as i32, 1)]);
        }
        assert_eq!(detector.calls.load(Ordering::SeqCst), frames.len());
    }

    #[test]
    fn test_failed_scan_yields_empty_slot() {
        let (adapter, _) = adapter();
        let result = adapter.detect_all(&[frame(5), frame(13), frame(1), frame(6)]);
        assert_eq!(result.len(), 4);
        assert_eq!(result[0].len(), 1);
        assert!(result[1].is_empty());
        assert!(result[2].is_empty());
        assert_eq!(result[3][0].width, 6);
    }

    #[test]
    fn test_malformed_rectangles_are_dropped() {
        struct Sloppy;
        impl FaceDetector for Sloppy {
            fn detect(&self, _frame: &Frame) -> Result<Vec<Rectangle>, DetectError> {
                Ok(vec![
                    Rectangle::new(-2, 0, 5, 5),
                    Rectangle::new(1, 1, 4, 4),
                    Rectangle::new(0, 0, 0, 3),
                ])
            }
        }
        let adapter = DetectorAdapter::new(Arc::new(Sloppy), DetectorConfig::default());
        assert_eq!(
            adapter.detect_all(&[frame(8)]),
            vec![vec![Rectangle::new(1, 1, 4, 4)]]
        );
    }
}
