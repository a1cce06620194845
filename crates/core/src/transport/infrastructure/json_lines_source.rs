use std::io::BufRead;

use crate::shared::head_detection::HeadDetectionArray;
use crate::transport::domain::batch_source::{BatchSource, SourceError};

/// Reads one JSON-encoded `HeadDetectionArray` per line. Blank lines are
/// skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    buf: String,
    line: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
        }
    }
}

impl<R: BufRead + Send> BatchSource for JsonLinesSource<R> {
    fn next_batch(&mut self) -> Option<Result<HeadDetectionArray, SourceError>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(SourceError::Io(e))),
            }
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|e| SourceError::Malformed {
                line: self.line,
                source: Box::new(e),
            }));
        }
    }
}
