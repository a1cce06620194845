use std::sync::Mutex;

use crate::detection::domain::face_detector::{DetectError, ExclusiveFaceDetector, FaceDetector};
use crate::shared::frame::Frame;
use crate::shared::rectangle::Rectangle;

/// Decorator that shares a non-reentrant classifier by holding one
/// exclusive lock for the duration of each scan.
pub struct SerializedFaceDetector {
    inner: Mutex<Box<dyn ExclusiveFaceDetector>>,
}

impl SerializedFaceDetector {
    pub fn new(inner: Box<dyn ExclusiveFaceDetector>) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl FaceDetector for SerializedFaceDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<Rectangle>, DetectError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| "classifier lock poisoned by an earlier panic")?;
        inner.detect(frame)
    }
}
