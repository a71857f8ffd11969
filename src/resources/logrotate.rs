//! Log rotation policy for the service log file.
use std::fmt::{self, Write as _};

use serde::Serialize;

use super::{Artifact, Declaration, MANAGED_HEADER, ResourceKind, SERVICE_NAME};

/// Number of rotated files kept.
pub const ROTATE_COUNT: u32 = 7;

/// Mode of the installed policy file.
const POLICY_MODE: &str = "0644";

/// Rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateEvery {
    /// Rotate once a day.
    Daily,
}

impl fmt::Display for RotateEvery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
        }
    }
}

/// Rotation policy for the service log file.
///
/// The policy itself is fixed; only the path and the ownership of newly
/// created files follow the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogrotateRule {
    /// Rule name, also the policy file name.
    pub name: String,
    /// Log file the rule applies to.
    pub path: String,
    /// Compress rotated files.
    pub compress: bool,
    /// Truncate in place instead of moving the live file.
    pub copytruncate: bool,
    /// Rotate even when the log is empty.
    pub ifempty: bool,
    /// Tolerate a missing log file.
    pub missingok: bool,
    /// Postpone compression by one cycle.
    pub delaycompress: bool,
    /// Number of rotated files kept.
    pub rotate: u32,
    /// Rotation frequency.
    pub rotate_every: RotateEvery,
    /// Mode of a freshly created log file.
    pub create_mode: String,
    /// Owner of a freshly created log file.
    pub create_owner: String,
    /// Group of a freshly created log file.
    pub create_group: String,
}

impl LogrotateRule {
    /// Declare the rule for `path`, creating new files with the given
    /// mode and ownership.
    #[must_use]
    pub fn new(path: String, mode: String, owner: String, group: String) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            path,
            compress: true,
            copytruncate: true,
            ifempty: false,
            missingok: true,
            delaycompress: false,
            rotate: ROTATE_COUNT,
            rotate_every: RotateEvery::Daily,
            create_mode: mode,
            create_owner: owner,
            create_group: group,
        }
    }

    /// Installed location of the policy file.
    #[must_use]
    pub fn policy_path(&self) -> String {
        format!("/etc/logrotate.d/{}", self.name)
    }

    /// Render the rule in logrotate's configuration syntax.
    #[must_use]
    pub fn render(&self) -> String {
        let flag = |on: bool, yes: &'static str, no: &'static str| if on { yes } else { no };

        let mut out = String::new();
        let _ = writeln!(out, "{MANAGED_HEADER}");
        let _ = writeln!(out);
        let _ = writeln!(out, "{} {{", self.path);
        let _ = writeln!(out, "  {}", flag(self.compress, "compress", "nocompress"));
        let _ = writeln!(
            out,
            "  {}",
            flag(self.copytruncate, "copytruncate", "nocopytruncate")
        );
        let _ = writeln!(
            out,
            "  create {} {} {}",
            self.create_mode, self.create_owner, self.create_group
        );
        let _ = writeln!(out, "  {}", self.rotate_every);
        let _ = writeln!(
            out,
            "  {}",
            flag(self.delaycompress, "delaycompress", "nodelaycompress")
        );
        let _ = writeln!(out, "  {}", flag(self.ifempty, "ifempty", "notifempty"));
        let _ = writeln!(out, "  {}", flag(self.missingok, "missingok", "nomissingok"));
        let _ = writeln!(out, "  rotate {}", self.rotate);
        let _ = writeln!(out, "}}");
        out
    }
}

impl Declaration for LogrotateRule {
    fn kind(&self) -> ResourceKind {
        ResourceKind::LogrotateRule
    }

    fn key(&self) -> &str {
        &self.name
    }

    fn artifact(&self) -> Option<Artifact> {
        Some(Artifact::File {
            path: self.policy_path(),
            content: self.render(),
            mode: POLICY_MODE.to_string(),
        })
    }
}
