use crate::shared::frame::Frame;
use crate::shared::rectangle::Rectangle;

pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for the face classifier.
///
/// One instance is shared by every batch for the lifetime of the process,
/// hence `&self` and `Sync`: implementations must not keep per-call state.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<Rectangle>, DetectError>;
}

/// A classifier that keeps mutable scratch state between scans.
///
/// Wrap it in
/// [`SerializedFaceDetector`](crate::detection::infrastructure::serialized_face_detector::SerializedFaceDetector)
/// to share it behind the [`FaceDetector`] interface.
pub trait ExclusiveFaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Rectangle>, DetectError>;
}
