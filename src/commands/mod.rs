//! Top-level subcommand orchestration (`plan`, `check`, `render`, `version`).
pub mod check;
pub mod plan;
pub mod render;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Configuration;
use crate::error::MimirStateError;
use crate::logging::Log;

/// Load the configuration named by the global options and log what it
/// declares.
///
/// # Errors
///
/// Returns an error if the configuration file exists but cannot be read or
/// parsed.
pub fn load_configuration(global: &GlobalOpts, log: &dyn Log) -> Result<Configuration> {
    log.stage("Loading configuration");
    if global.config.exists() {
        log.info(&format!("config: {}", global.config.display()));
    } else {
        log.warn(&format!(
            "no configuration at {}, using defaults",
            global.config.display()
        ));
    }

    let config = Configuration::load(&global.config).map_err(MimirStateError::from)?;

    log.debug(&format!("package ensure: {}", config.package_ensure));
    log.debug(&format!("manage user: {}", config.manage_user));
    log.debug(&format!("log to file: {}", config.log_to_file));
    log.debug(&format!(
        "{} systemd override section(s)",
        config
            .systemd_overrides
            .as_ref()
            .map_or(0, |o| o.sections().count())
    ));
    log.debug(&format!(
        "{} top-level config_hash key(s)",
        config.config_hash.as_ref().map_or(0, serde_yaml_ng::Mapping::len)
    ));

    Ok(config)
}
