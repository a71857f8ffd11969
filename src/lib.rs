//! Desired-state resolver for the mimir system service.
//!
//! Turns a small typed configuration into the complete, ordered list of
//! resources a convergence engine must enforce to install and run mimir:
//! package, optional system user, configuration tree, systemd drop-in,
//! optional file logging with rotation, and the service itself.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load and deserialize the TOML configuration
//! - **[`resources`]**: one typed declaration per resource kind, plus the
//!   byte-exact renderers for generated files
//! - **[`resolver`]**: the pure validation and resolution pass
//! - **[`commands`]**: top-level subcommand orchestration (`plan`, `check`, `render`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resolver;
pub mod resources;
