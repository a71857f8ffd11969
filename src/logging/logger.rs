//! Structured logger with step summary collection.
use std::sync::Mutex;

use super::types::{Log, StepEntry, StepStatus};

/// Target used for stage headers so the console formatter can style them.
pub(super) const STAGE_TARGET: &str = "mimir_state::stage";

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger emitting [`tracing`] events and collecting step results.
#[derive(Debug, Default)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
}

impl Logger {
    /// Create a new logger with an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a step result for the summary.
    pub fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.steps.lock() {
            guard.push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a clone of all recorded steps.
    #[must_use]
    pub fn steps(&self) -> Vec<StepEntry> {
        self.steps.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.steps.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|s| s.status == StepStatus::Failed)
                .count()
        })
    }

    /// Log the summary of all recorded steps.
    pub fn print_summary(&self) {
        let steps = self.steps();
        if steps.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for step in &steps {
            let (icon, color) = match step.status {
                StepStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                StepStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                StepStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = step
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", step.name));
        }

        let total = ok + skipped + failed;
        self.info(&format!(
            "{total} steps: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.record_step(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn logger_new_has_no_steps() {
        let log = Logger::new();
        assert!(log.steps().is_empty());
        assert_eq!(log.failure_count(), 0);
    }

    #[test]
    fn record_step_with_message() {
        let log = Logger::new();
        log.record_step("File[/etc/mimir/config.yml]", StepStatus::Ok, Some("validated"));
        let steps = log.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].message.as_deref(), Some("validated"));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let log = Logger::new();
        log.record_step("a", StepStatus::Ok, None);
        log.record_step("b", StepStatus::Failed, Some("exit 1"));
        log.record_step("c", StepStatus::Skipped, None);
        log.record_step("d", StepStatus::Failed, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let log = Logger::new();
        let log_ref: &dyn Log = &log;
        log_ref.info("via trait");
        log_ref.record_step("via-trait", StepStatus::Ok, None);
        assert_eq!(log.steps().len(), 1);
    }
}
