//! Service resource.
use serde::Serialize;

use super::{Declaration, Ensure, ResourceKind, SERVICE_NAME};

/// The `mimir` service, always running and enabled at boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Always [`Ensure::Running`].
    pub ensure: Ensure,
    /// Start at boot.
    pub enable: bool,
    /// The service manager can query status.
    pub hasstatus: bool,
    /// The service manager can restart it.
    pub hasrestart: bool,
    /// Command used for the restart action.
    pub restart: String,
}

impl Service {
    /// Declare the `mimir` service with a custom restart command.
    #[must_use]
    pub fn new(restart: String) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            ensure: Ensure::Running,
            enable: true,
            hasstatus: true,
            hasrestart: true,
            restart,
        }
    }
}

impl Declaration for Service {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Service
    }

    fn key(&self) -> &str {
        &self.name
    }
}
