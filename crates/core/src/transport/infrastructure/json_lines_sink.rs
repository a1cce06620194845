use std::io::Write;

use crate::shared::head_detection::HeadDetectionArray;
use crate::transport::domain::batch_sink::BatchSink;

/// Writes one JSON-encoded `HeadDetectionArray` per line and flushes after
/// every batch so downstream readers see it immediately.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> BatchSink for JsonLinesSink<W> {
    fn publish(&mut self, batch: &HeadDetectionArray) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.writer, batch)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
