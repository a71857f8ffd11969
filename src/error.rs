//! Domain-specific error types for the mimir desired-state resolver.
//!
//! Internal modules return typed errors (e.g., [`ValidationError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! MimirStateError
//! ├── Validation(ValidationError) : conflicting configuration intent
//! ├── Config(ConfigError)         : reading or parsing the TOML file
//! └── Render(RenderError)         : staging generated artifacts
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the resolver.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum MimirStateError {
    /// The configuration expresses conflicting intent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generated artifacts could not be staged or validated.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors raised by the resolver's validation gate.
///
/// A validation error always short-circuits resolution: no resource is
/// emitted when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `log_to_file` and a caller-supplied `Service.StandardOutput` or
    /// `Service.StandardError` override both try to route process output.
    #[error(
        "log_to_file option is not compatible with systemd overrides: StandardOutput or StandardError"
    )]
    OutputCollision,
}

/// Errors that arise while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the configuration schema.
    #[error("Invalid configuration in {}: {message}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message, including the location of the problem.
        message: String,
    },
}

/// Errors that arise while staging rendered artifacts.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing a staged file or directory failed.
    #[error("IO error staging {}: {source}", path.display())]
    Io {
        /// Staged path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A resource path would be staged outside the destination directory.
    #[error("Path {path} escapes the staging directory")]
    EscapesDestination {
        /// Offending resource path.
        path: String,
    },

    /// A declared mode is not an octal number.
    #[error("Invalid mode '{mode}' for {path}")]
    InvalidMode {
        /// Resource path carrying the mode.
        path: String,
        /// Offending mode string.
        mode: String,
    },

    /// Content could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(String),

    /// The validation command rejected the staged content.
    #[error("Validation command '{command}' rejected content (exit {exit_code}): {stderr}")]
    ValidationFailed {
        /// Command line that was executed.
        command: String,
        /// Exit code returned by the process (`-1` when killed by a signal).
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// The validation command is empty.
    #[error("Validation command is empty")]
    EmptyValidateCommand,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn output_collision_display() {
        assert_eq!(
            ValidationError::OutputCollision.to_string(),
            "log_to_file option is not compatible with systemd overrides: StandardOutput or StandardError"
        );
    }

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/mimir-state.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/etc/mimir-state.toml"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/mimir-state.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_parse_display() {
        let e = ConfigError::Parse {
            path: PathBuf::from("mimir.toml"),
            message: "unknown field `colour`".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid configuration in mimir.toml: unknown field `colour`"
        );
    }

    #[test]
    fn render_error_validation_failed_display() {
        let e = RenderError::ValidationFailed {
            command: "/usr/local/bin/mimir --modules=true".to_string(),
            exit_code: 2,
            stderr: "bad yaml".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("/usr/local/bin/mimir"));
        assert!(msg.contains("exit 2"));
        assert!(msg.contains("bad yaml"));
    }

    #[test]
    fn validation_error_passes_through_top_level() {
        let e: MimirStateError = ValidationError::OutputCollision.into();
        assert_eq!(e.to_string(), ValidationError::OutputCollision.to_string());
    }

    #[test]
    fn top_level_wraps_config_error() {
        let e: MimirStateError = ConfigError::Parse {
            path: PathBuf::from("x.toml"),
            message: "oops".to_string(),
        }
        .into();
        assert!(e.to_string().starts_with("Configuration error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<MimirStateError>();
        assert_send_sync::<ValidationError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<RenderError>();
    }

    #[test]
    fn validation_error_converts_to_anyhow() {
        let _anyhow_err: anyhow::Error = ValidationError::OutputCollision.into();
    }
}
