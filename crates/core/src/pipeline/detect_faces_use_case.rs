use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pipeline::batch_logger::BatchLogger;
use crate::pipeline::frame_coordinator::{FrameCoordinator, ProcessError};
use crate::pipeline::infrastructure::deadline::process_with_deadline;
use crate::shared::head_detection::HeadDetectionArray;
use crate::transport::domain::batch_sink::BatchSink;
use crate::transport::domain::batch_source::{BatchSource, SourceError};

/// Counters for one run of the node loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub received: usize,
    pub published: usize,
    pub dropped: usize,
}

/// Node loop: source → coordinator → sink, one batch at a time.
///
/// A batch that fails to decode or process is logged and dropped; the loop
/// keeps going. A failing source channel or sink ends the run.
pub struct DetectFacesUseCase {
    source: Box<dyn BatchSource>,
    sink: Box<dyn BatchSink>,
    coordinator: Arc<FrameCoordinator>,
    deadline: Option<Duration>,
    logger: Box<dyn BatchLogger>,
}

impl DetectFacesUseCase {
    pub fn new(
        source: Box<dyn BatchSource>,
        sink: Box<dyn BatchSink>,
        coordinator: Arc<FrameCoordinator>,
        deadline: Option<Duration>,
        logger: Box<dyn BatchLogger>,
    ) -> Self {
        Self {
            source,
            sink,
            coordinator,
            deadline,
            logger,
        }
    }

    pub fn execute(&mut self) -> Result<RunStats, Box<dyn std::error::Error>> {
        let mut stats = RunStats::default();

        while let Some(next) = self.source.next_batch() {
            stats.received += 1;
            let batch = match next {
                Ok(batch) => batch,
                Err(SourceError::Io(e)) => return Err(e.into()),
                Err(e @ SourceError::Malformed { .. }) => {
                    log::error!("Dropping inbound message: {e}");
                    self.drop_batch(&mut stats);
                    continue;
                }
            };

            let seq = batch.header.seq;
            let heads = batch.len();
            let started = Instant::now();
            let result = self.process(batch);
            self.logger
                .timing("process", started.elapsed().as_secs_f64() * 1000.0);

            let batch = match result {
                Ok(batch) => batch,
                Err(e) => {
                    log::error!("Dropping batch seq={seq} ({heads} heads): {e}");
                    self.drop_batch(&mut stats);
                    continue;
                }
            };

            let started = Instant::now();
            self.sink.publish(&batch)?;
            self.logger
                .timing("publish", started.elapsed().as_secs_f64() * 1000.0);
            self.logger.metric("heads", heads as f64);
            self.logger.metric("faces", batch.face_count() as f64);
            self.logger.batch_done(true);
            stats.published += 1;
        }

        self.logger.info(&format!(
            "Input closed after {} batches ({} published, {} dropped)",
            stats.received, stats.published, stats.dropped
        ));
        self.logger.summary();
        Ok(stats)
    }

    fn process(&self, batch: HeadDetectionArray) -> Result<HeadDetectionArray, ProcessError> {
        match self.deadline {
            Some(deadline) => process_with_deadline(&self.coordinator, batch, deadline),
            None => self.coordinator.process(batch),
        }
    }

    fn drop_batch(&mut self, stats: &mut RunStats) {
        stats.dropped += 1;
        self.logger.batch_done(false);
    }
}
