use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::pipeline::frame_coordinator::{FrameCoordinator, ProcessError};
use crate::shared::head_detection::HeadDetectionArray;

/// Runs [`FrameCoordinator::process`] on a worker thread and gives up after
/// `deadline`.
///
/// The worker is not interrupted on overrun; it finishes in the background
/// and its late result is dropped.
pub fn process_with_deadline(
    coordinator: &Arc<FrameCoordinator>,
    batch: HeadDetectionArray,
    deadline: Duration,
) -> Result<HeadDetectionArray, ProcessError> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let worker = Arc::clone(coordinator);

    std::thread::spawn(move || {
        // Receiver is gone after a timeout.
        let _ = tx.send(worker.process(batch));
    });

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ProcessError::Timeout { deadline }),
        Err(RecvTimeoutError::Disconnected) => Err(ProcessError::WorkerLost),
    }
}
