use std::collections::HashMap;
use tracing::{info, warn};

/// Tracing target for progress events. The CLI's log formatter renders events
/// on this target as Stash progress lines instead of log lines.
pub const PROGRESS_TARGET: &str = "stash_progress";

/// Receiver for overall task progress in [0, 1]
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64);
}

/// Emits progress as a tracing event on [`PROGRESS_TARGET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, fraction: f64) {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        info!(target: PROGRESS_TARGET, progress = fraction);
    }
}

/// Counts outcomes for one batch of remote updates and logs a summary at the end
pub struct ProgressTracker {
    total: usize,
    succeeded: usize,
    failed: usize,
    start_time: std::time::Instant,
    error_counts: HashMap<String, usize>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            start_time: std::time::Instant::now(),
            error_counts: HashMap::new(),
        }
    }

    pub fn record_succeeded(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failure grouped under `error_category` for the summary
    pub fn record_failed_with_error(&mut self, error_category: &str) {
        self.failed += 1;
        *self.error_counts.entry(error_category.to_string()).or_insert(0) += 1;
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if self.failed > 0 {
            warn!(
                "{} completed: {} total in {:.1}s | Succeeded: {} | Failed: {}",
                operation_name, self.total, elapsed, self.succeeded, self.failed
            );
            if !self.error_counts.is_empty() {
                let mut error_entries: Vec<_> = self.error_counts.iter().collect();
                error_entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                let error_summary: Vec<String> = error_entries
                    .iter()
                    .map(|(category, count)| format!("{}: {}", category, count))
                    .collect();
                info!("Error breakdown: {}", error_summary.join(", "));
            }
        } else {
            info!(
                "{} completed: {} total in {:.1}s | Succeeded: {}",
                operation_name, self.total, elapsed, self.succeeded
            );
        }
    }
}
