//! Systemd drop-in resource and its content generator.
use std::fmt::Write as _;

use serde::Serialize;

use super::{Artifact, Declaration, MANAGED_HEADER, ResourceKind};
use crate::config::overrides::{SERVICE_SECTION, SystemdOverrides};

/// File name of the drop-in fragment.
pub const DROPIN_NAME: &str = "mimir-dropin.conf";

/// Unit the drop-in extends.
pub const UNIT_NAME: &str = "mimir.service";

/// File descriptor limit applied when no overrides are configured.
pub const DEFAULT_LIMIT_NOFILE: &str = "1048576";

/// Mode of the installed drop-in file.
const DROPIN_MODE: &str = "0644";

/// A systemd drop-in fragment for `mimir.service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemdDropin {
    /// Fragment file name.
    pub name: String,
    /// Unit the fragment extends.
    pub unit: String,
    /// Rendered INI content.
    pub content: String,
}

impl SystemdDropin {
    /// Declare the drop-in with rendered content.
    #[must_use]
    pub fn new(content: String) -> Self {
        Self {
            name: DROPIN_NAME.to_string(),
            unit: UNIT_NAME.to_string(),
            content,
        }
    }

    /// Installed location, `/etc/systemd/system/<unit>.d/<name>`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/etc/systemd/system/{}.d/{}", self.unit, self.name)
    }
}

impl Declaration for SystemdDropin {
    fn kind(&self) -> ResourceKind {
        ResourceKind::SystemdDropin
    }

    fn key(&self) -> &str {
        &self.name
    }

    fn artifact(&self) -> Option<Artifact> {
        Some(Artifact::File {
            path: self.path(),
            content: self.content.clone(),
            mode: DROPIN_MODE.to_string(),
        })
    }
}

/// Render the drop-in content.
///
/// Layout:
///
/// ```text
/// # MANAGED BY PUPPET
/// [Service]
/// <Service overrides in supplied order, or LimitNOFILE=1048576 without overrides>
/// <StandardOutput/StandardError redirection when logging to a file>
/// <remaining override sections, each under its own header>
/// ```
///
/// `log_file` is the full log path when file logging is enabled.
///
/// # Examples
///
/// ```
/// use mimir_state::resources::systemd_dropin::render;
///
/// assert_eq!(
///     render(None, None),
///     "# MANAGED BY PUPPET\n[Service]\nLimitNOFILE=1048576\n"
/// );
/// ```
#[must_use]
pub fn render(overrides: Option<&SystemdOverrides>, log_file: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{MANAGED_HEADER}");
    let _ = writeln!(out, "[{SERVICE_SECTION}]");

    match overrides {
        None => {
            let _ = writeln!(out, "LimitNOFILE={DEFAULT_LIMIT_NOFILE}");
        }
        Some(overrides) => {
            for (key, value) in overrides.service().iter().flat_map(|s| &s.entries) {
                let _ = writeln!(out, "{key}={value}");
            }
        }
    }

    if let Some(log_file) = log_file {
        let _ = writeln!(out, "StandardOutput=append:{log_file}");
        let _ = writeln!(out, "StandardError=inherit");
    }

    for section in overrides
        .into_iter()
        .flat_map(SystemdOverrides::sections)
        .filter(|s| s.name != SERVICE_SECTION)
    {
        let _ = writeln!(out, "[{}]", section.name);
        for (key, value) in &section.entries {
            let _ = writeln!(out, "{key}={value}");
        }
    }

    out
}
