use thiserror::Error;

use crate::shared::head_detection::HeadDetectionArray;

#[derive(Error, Debug)]
pub enum SourceError {
    /// One inbound message could not be decoded. Later messages may still be
    /// fine.
    #[error("malformed message at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The channel itself failed; nothing more can be read.
    #[error("failed to read from source: {0}")]
    Io(#[from] std::io::Error),
}

/// Inbound side of the node: yields head-detection batches in arrival order.
pub trait BatchSource: Send {
    /// Returns the next batch, or `None` once the source is exhausted.
    fn next_batch(&mut self) -> Option<Result<HeadDetectionArray, SourceError>>;
}
