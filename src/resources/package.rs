//! Package resource.
use serde::Serialize;

use super::{Declaration, ResourceKind, SERVICE_NAME};
use crate::config::package_ensure::PackageEnsure;

/// The `mimir` system package.
///
/// Declares only `ensure`; the package manager is left to the convergence
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Package name.
    pub name: String,
    /// Desired package state.
    pub ensure: PackageEnsure,
}

impl Package {
    /// Declare the `mimir` package with the given state.
    #[must_use]
    pub fn new(ensure: PackageEnsure) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            ensure,
        }
    }
}

impl Declaration for Package {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Package
    }

    fn key(&self) -> &str {
        &self.name
    }
}
