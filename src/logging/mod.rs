//! Logging infrastructure for structured console output.

mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::{LOG_ENV_VAR, init_subscriber};
pub use types::{Log, StepEntry, StepStatus};

#[cfg(test)]
pub(crate) use types::RecordingLog;
