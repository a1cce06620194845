use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use crate::detection::domain::detector_adapter::DetectorAdapter;
use crate::shared::frame::Frame;
use crate::shared::head_detection::{HeadDetection, HeadDetectionArray};
use crate::shared::image_message::ConvertError;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("color image of head {index} could not be converted: {source}")]
    ConversionFailed {
        index: usize,
        #[source]
        source: ConvertError,
    },
    #[error("batch not finished within {deadline:?}")]
    Timeout { deadline: Duration },
    #[error("batch worker exited without a result")]
    WorkerLost,
}

/// Fans one batch of head crops out to the detector and merges the face
/// rectangles back into the records they came from.
///
/// A batch is all-or-nothing: if any crop cannot be converted, nothing is
/// returned for the batch.
pub struct FrameCoordinator {
    adapter: Arc<DetectorAdapter>,
}

impl FrameCoordinator {
    pub fn new(adapter: Arc<DetectorAdapter>) -> Self {
        Self { adapter }
    }

    /// Takes ownership of `batch`, appends the faces found in each head's
    /// color image to its `face_detections`, and hands the batch back.
    ///
    /// The detector is invoked once per batch, never per head, and not at
    /// all for an empty batch.
    pub fn process(&self, mut batch: HeadDetectionArray) -> Result<HeadDetectionArray, ProcessError> {
        if batch.is_empty() {
            return Ok(batch);
        }

        let started = Instant::now();
        let frames = convert_all(&batch.head_detections)?;
        let converted = Instant::now();

        let faces = self.adapter.detect_all(&frames);
        debug_assert_eq!(faces.len(), batch.len());

        for (head, found) in batch.head_detections.iter_mut().zip(faces) {
            head.face_detections.extend(found);
        }

        log::debug!(
            "Batch seq={}: {} heads, {} faces (convert {:.1}ms, detect {:.1}ms)",
            batch.header.seq,
            batch.len(),
            batch.face_count(),
            (converted - started).as_secs_f64() * 1000.0,
            converted.elapsed().as_secs_f64() * 1000.0
        );
        Ok(batch)
    }
}

fn convert_all(heads: &[HeadDetection]) -> Result<Vec<Frame>, ProcessError> {
    heads
        .par_iter()
        .enumerate()
        .map(|(index, head)| {
            head.color_image
                .to_frame()
                .map_err(|source| ProcessError::ConversionFailed { index, source })
        })
        .collect()
}
