//! System user resource.
use serde::Serialize;

use super::{Declaration, Ensure, ResourceKind, SERVICE_NAME};

/// The `mimir` system account, declared only when user management is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Account name.
    pub name: String,
    /// Always [`Ensure::Present`].
    pub ensure: Ensure,
    /// Allocate the account from the system UID range.
    pub system: bool,
    /// Supplementary groups.
    pub groups: Vec<String>,
    /// Login shell.
    pub shell: String,
    /// Home directory.
    pub home: String,
    /// Create the home directory when missing.
    pub managehome: bool,
}

impl User {
    /// Declare the `mimir` system user.
    #[must_use]
    pub fn new(groups: Vec<String>, shell: String, home: String) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            ensure: Ensure::Present,
            system: true,
            groups,
            shell,
            home,
            managehome: true,
        }
    }
}

impl Declaration for User {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn key(&self) -> &str {
        &self.name
    }
}
