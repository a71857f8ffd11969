//! Desired-state resolution: configuration in, managed resources out.
//!
//! Resolution is a pure function. It validates the configuration first and
//! then builds the full resource list from scratch, so identical input always
//! yields an identical, byte-stable result.
use serde::Serialize;

use crate::config::Configuration;
use crate::config::overrides::SystemdOverrides;
use crate::error::{MimirStateError, ValidationError};
use crate::resources::file::{CONFIG_DIR_MODE, CONFIG_FILE_MODE, DEFAULT_FILE_PATH};
use crate::resources::{
    Declaration, Directory, File, LogrotateRule, ManagedResource, Package, Service,
    SystemdDropin, User, systemd_dropin, yaml,
};

/// Directives that route process output and therefore collide with
/// `log_to_file`.
const OUTPUT_DIRECTIVES: [&str; 2] = ["StandardOutput", "StandardError"];

/// Reject configurations that express conflicting intent.
///
/// # Errors
///
/// Returns [`ValidationError::OutputCollision`] when `log_to_file` is set and
/// the `Service` overrides also set `StandardOutput` or `StandardError`.
pub fn validate(config: &Configuration) -> Result<(), ValidationError> {
    if !config.log_to_file {
        return Ok(());
    }
    let collides = config
        .systemd_overrides
        .as_ref()
        .and_then(SystemdOverrides::service)
        .is_some_and(|service| OUTPUT_DIRECTIVES.iter().any(|d| service.contains_key(d)));
    if collides {
        return Err(ValidationError::OutputCollision);
    }
    Ok(())
}

/// Compute every resource the configuration declares.
///
/// Resources come out in application order: package, user, log directory,
/// configuration directory and file, environment file, drop-in, log file,
/// logrotate rule, service.
///
/// # Errors
///
/// Returns [`MimirStateError::Validation`] without any partial output when
/// [`validate`] rejects the configuration, and [`MimirStateError::Render`] if
/// `config_hash` cannot be rendered as YAML.
pub fn resolve(config: &Configuration) -> Result<Vec<ManagedResource>, MimirStateError> {
    validate(config)?;

    let log_file = config.log_to_file.then(|| config.log_file());
    let mut resources: Vec<ManagedResource> = Vec::new();

    resources.push(Package::new(config.package_ensure.clone()).into());

    if config.manage_user {
        resources.push(
            User::new(
                config.user_extra_groups.clone(),
                config.user_shell.clone(),
                config.user_home.clone(),
            )
            .into(),
        );
    }

    if config.log_to_file {
        resources.push(
            Directory::new(
                config.log_dir_path.clone(),
                config.log_owner.clone(),
                config.log_group.clone(),
                config.log_dir_mode.clone(),
            )
            .into(),
        );
    }

    resources.push(
        Directory::new(
            config.config_dir.clone(),
            config.config_owner.clone(),
            config.config_group.clone(),
            CONFIG_DIR_MODE.to_string(),
        )
        .into(),
    );

    resources.push(
        File::rendered(
            config.config_file(),
            yaml::render_document(config.config_hash.as_ref())?,
            config.config_owner.clone(),
            config.config_group.clone(),
            config.validate_cmd.clone(),
        )
        .into(),
    );

    resources.push(
        File::unmanaged_content(DEFAULT_FILE_PATH, "root", "root", CONFIG_FILE_MODE).into(),
    );

    resources.push(
        SystemdDropin::new(systemd_dropin::render(
            config.systemd_overrides.as_ref(),
            log_file.as_deref(),
        ))
        .into(),
    );

    if let Some(log_file) = log_file {
        resources.push(
            File::placeholder(
                log_file.clone(),
                config.log_owner.clone(),
                config.log_group.clone(),
                config.log_file_mode.clone(),
            )
            .into(),
        );
        resources.push(
            LogrotateRule::new(
                log_file,
                config.log_file_mode.clone(),
                config.log_owner.clone(),
                config.log_group.clone(),
            )
            .into(),
        );
    }

    resources.push(Service::new(config.restart_cmd.clone()).into());

    tracing::debug!("resolved {} resources", resources.len());
    Ok(resources)
}

/// A resolved resource list plus the relationships the convergence engine
/// needs to apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Resources in application order.
    pub resources: Vec<ManagedResource>,
    /// Descriptions of resources whose change must trigger the service's
    /// restart action. Empty unless `restart_on_change` is set.
    pub restart_triggers: Vec<String>,
    /// Extra service arguments, passed through as configured.
    pub custom_args: Vec<String>,
}

impl Plan {
    /// Find a resource by its description (e.g. `File[/etc/default/mimir]`).
    #[must_use]
    pub fn find(&self, description: &str) -> Option<&ManagedResource> {
        self.resources
            .iter()
            .find(|r| r.description() == description)
    }
}

/// Resolve the configuration into a [`Plan`].
///
/// # Errors
///
/// Propagates every error of [`resolve`].
pub fn plan(config: &Configuration) -> Result<Plan, MimirStateError> {
    let resources = resolve(config)?;

    let restart_triggers = if config.restart_on_change {
        resources
            .iter()
            .filter(|r| is_restart_trigger(r))
            .map(Declaration::description)
            .collect()
    } else {
        Vec::new()
    };

    Ok(Plan {
        resources,
        restart_triggers,
        custom_args: config.custom_args.clone(),
    })
}

/// Configuration-bearing resources: rendered files, the environment file,
/// and the drop-in.
fn is_restart_trigger(resource: &ManagedResource) -> bool {
    match resource {
        ManagedResource::File(file) => file.content.is_some() || file.path == DEFAULT_FILE_PATH,
        ManagedResource::SystemdDropin(_) => true,
        _ => false,
    }
}
