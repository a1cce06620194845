use std::collections::HashMap;
use std::time::Instant;

/// Observer for the batch loop.
///
/// Keeps the node loop free of output concerns; the binary logs through the
/// `log` crate, tests pass [`NullBatchLogger`].
pub trait BatchLogger: Send {
    /// Report that one inbound batch was handled, successfully or not.
    fn batch_done(&mut self, published: bool);

    /// Record how long a named stage took for one batch.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-batch metric (e.g. heads, faces).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullBatchLogger;

impl BatchLogger for NullBatchLogger {
    fn batch_done(&mut self, _published: bool) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Collects stage timings and metrics and writes them through `log`.
///
/// A progress line is logged every `report_every` batches.
pub struct LogBatchLogger {
    report_every: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    batches: usize,
    dropped: usize,
}

impl LogBatchLogger {
    pub fn new(report_every: usize) -> Self {
        Self {
            report_every: report_every.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            batches: 0,
            dropped: 0,
        }
    }

    /// Returns the formatted summary, or `None` before the first batch.
    pub fn summary_string(&self) -> Option<String> {
        if self.batches == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Run summary ({} batches, {} dropped, {:.1}s total):",
            self.batches,
            self.dropped,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let total: f64 = values.iter().sum();
            lines.push(format!("  {name}: avg {:.1}  total {total:.0}", mean(values)));
        }

        if elapsed_ms > 0.0 {
            let rate = self.batches as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} batches/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for LogBatchLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl BatchLogger for LogBatchLogger {
    fn batch_done(&mut self, published: bool) {
        self.batches += 1;
        if !published {
            self.dropped += 1;
        }
        if self.batches % self.report_every == 0 {
            log::info!(
                "Handled {} batches ({} dropped)",
                self.batches,
                self.dropped
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
