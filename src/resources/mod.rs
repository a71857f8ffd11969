//! Managed resource declarations handed to the convergence engine.
//!
//! Every variant of [`ManagedResource`] wraps a struct carrying exactly the
//! attributes that resource declares; there is no generic attribute bag.
pub mod file;
pub mod logrotate;
pub mod package;
pub mod service;
pub mod systemd_dropin;
pub mod user;
pub mod yaml;

use std::fmt;

use serde::Serialize;

pub use file::{Directory, File};
pub use logrotate::LogrotateRule;
pub use package::Package;
pub use service::Service;
pub use systemd_dropin::SystemdDropin;
pub use user::User;

/// Name shared by the package, user, service, and logrotate rule.
pub const SERVICE_NAME: &str = "mimir";

/// Header line written at the top of every generated file.
pub const MANAGED_HEADER: &str = "# MANAGED BY PUPPET";

/// Desired presence state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// The resource exists; content is not managed.
    Present,
    /// The path is a regular file.
    File,
    /// The path is a directory.
    Directory,
    /// The service is running.
    Running,
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::File => "file",
            Self::Directory => "directory",
            Self::Running => "running",
        })
    }
}

/// Kind of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// System package.
    Package,
    /// System user account.
    User,
    /// Filesystem directory.
    Directory,
    /// Filesystem file.
    File,
    /// Systemd unit drop-in fragment.
    SystemdDropin,
    /// Log rotation policy.
    LogrotateRule,
    /// System service.
    Service,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Package => "Package",
            Self::User => "User",
            Self::Directory => "Directory",
            Self::File => "File",
            Self::SystemdDropin => "SystemdDropin",
            Self::LogrotateRule => "LogrotateRule",
            Self::Service => "Service",
        })
    }
}

/// A generated filesystem artifact that can be staged for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// A directory with an octal mode.
    Directory {
        /// Absolute path on the target system.
        path: String,
        /// Octal mode (e.g., `"0750"`).
        mode: String,
    },
    /// A regular file with exact content.
    File {
        /// Absolute path on the target system.
        path: String,
        /// Byte-stable file content.
        content: String,
        /// Octal mode (e.g., `"0640"`).
        mode: String,
    },
}

impl Artifact {
    /// Absolute path on the target system.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path, .. } | Self::File { path, .. } => path,
        }
    }
}

/// Common interface of every declared resource.
pub trait Declaration {
    /// Kind of this resource.
    fn kind(&self) -> ResourceKind;

    /// Unique key within its kind (name or absolute path).
    fn key(&self) -> &str;

    /// Human-readable description, e.g. `Package[mimir]`.
    fn description(&self) -> String {
        format!("{}[{}]", self.kind(), self.key())
    }

    /// Filesystem artifact this resource produces, if it renders one.
    fn artifact(&self) -> Option<Artifact> {
        None
    }
}

/// A managed resource, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManagedResource {
    /// See [`Package`].
    Package(Package),
    /// See [`User`].
    User(User),
    /// See [`Directory`].
    Directory(Directory),
    /// See [`File`].
    File(File),
    /// See [`SystemdDropin`].
    SystemdDropin(SystemdDropin),
    /// See [`LogrotateRule`].
    LogrotateRule(LogrotateRule),
    /// See [`Service`].
    Service(Service),
}

/// Forward [`Declaration`] methods to the wrapped struct of every variant,
/// and generate the matching `From` conversions.
macro_rules! forward_declaration {
    ($($variant:ident),+ $(,)?) => {
        impl Declaration for ManagedResource {
            fn kind(&self) -> ResourceKind {
                match self {
                    $(Self::$variant(r) => r.kind(),)+
                }
            }

            fn key(&self) -> &str {
                match self {
                    $(Self::$variant(r) => r.key(),)+
                }
            }

            fn artifact(&self) -> Option<Artifact> {
                match self {
                    $(Self::$variant(r) => r.artifact(),)+
                }
            }
        }

        $(
            impl From<$variant> for ManagedResource {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

forward_declaration!(
    Package,
    User,
    Directory,
    File,
    SystemdDropin,
    LogrotateRule,
    Service,
);
