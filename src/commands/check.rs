//! Check command implementation.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::resolver;

/// Run the check command: load and resolve the configuration, reporting
/// only whether it is consistent.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or fails
/// validation.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let config = super::load_configuration(global, log)?;

    log.stage("Validating configuration");
    let resources = resolver::resolve(&config)?;
    log.info(&format!(
        "configuration is valid ({} resources)",
        resources.len()
    ));
    Ok(())
}
