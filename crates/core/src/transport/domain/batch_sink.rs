use crate::shared::head_detection::HeadDetectionArray;

/// Outbound side of the node: publishes enriched batches.
pub trait BatchSink: Send {
    fn publish(&mut self, batch: &HeadDetectionArray) -> Result<(), Box<dyn std::error::Error>>;
}
