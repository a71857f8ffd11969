//! Core logging types: step entries, status, and the [`Log`] trait.

/// Result of a command step, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Human-readable step name (usually a resource description).
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step completed successfully.
    Ok,
    /// Step was skipped because it does not apply.
    Skipped,
    /// Step encountered an error.
    Failed,
}

/// Abstraction over logging backends.
///
/// Command code logs through this trait so tests can substitute a recording
/// implementation.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
}

/// [`Log`] implementation that keeps every message, for asserting on what a
/// command reported.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    entries: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, msg.to_string()));
        }
    }

    /// Messages recorded at `level` (`"warn"`, `"error"`, `"step"`, ...).
    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.entries.lock().map_or_else(
            |_| vec![],
            |guard| {
                guard
                    .iter()
                    .filter(|(l, _)| *l == level)
                    .map(|(_, m)| m.clone())
                    .collect()
            },
        )
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_step(&self, name: &str, _status: StepStatus, _message: Option<&str>) {
        self.push("step", name);
    }
}
