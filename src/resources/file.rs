//! Directory and file resources.
use serde::Serialize;

use super::{Artifact, Declaration, Ensure, ResourceKind};

/// Mode of the configuration directory.
pub const CONFIG_DIR_MODE: &str = "0750";

/// Mode of `config.yml` and the environment file.
pub const CONFIG_FILE_MODE: &str = "0640";

/// Environment file read by the service unit.
pub const DEFAULT_FILE_PATH: &str = "/etc/default/mimir";

/// A directory with ownership and mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// Absolute path.
    pub path: String,
    /// Always [`Ensure::Directory`].
    pub ensure: Ensure,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Octal mode.
    pub mode: String,
}

impl Directory {
    /// Declare a directory.
    #[must_use]
    pub const fn new(path: String, owner: String, group: String, mode: String) -> Self {
        Self {
            path,
            ensure: Ensure::Directory,
            owner,
            group,
            mode,
        }
    }
}

impl Declaration for Directory {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Directory
    }

    fn key(&self) -> &str {
        &self.path
    }

    fn artifact(&self) -> Option<Artifact> {
        Some(Artifact::Directory {
            path: self.path.clone(),
            mode: self.mode.clone(),
        })
    }
}

/// A file with ownership, mode, and optionally managed content.
///
/// `content` and `validate_cmd` are omitted from the serialized form when
/// unset, so a file declares only the attributes it actually manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// Absolute path.
    pub path: String,
    /// [`Ensure::File`] or [`Ensure::Present`].
    pub ensure: Ensure,
    /// Exact content; `None` leaves the content unmanaged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Octal mode.
    pub mode: String,
    /// Command that must accept the content before it is installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_cmd: Option<String>,
}

impl File {
    /// Declare a file whose content is rendered and must pass `validate_cmd`.
    #[must_use]
    pub fn rendered(
        path: String,
        content: String,
        owner: String,
        group: String,
        validate_cmd: String,
    ) -> Self {
        Self {
            path,
            ensure: Ensure::File,
            content: Some(content),
            owner,
            group,
            mode: CONFIG_FILE_MODE.to_string(),
            validate_cmd: Some(validate_cmd),
        }
    }

    /// Declare a regular file whose content is managed elsewhere.
    #[must_use]
    pub fn unmanaged_content(path: &str, owner: &str, group: &str, mode: &str) -> Self {
        Self {
            path: path.to_string(),
            ensure: Ensure::File,
            content: None,
            owner: owner.to_string(),
            group: group.to_string(),
            mode: mode.to_string(),
            validate_cmd: None,
        }
    }

    /// Declare a file that only has to exist (e.g., a log file).
    #[must_use]
    pub const fn placeholder(path: String, owner: String, group: String, mode: String) -> Self {
        Self {
            path,
            ensure: Ensure::Present,
            content: None,
            owner,
            group,
            mode,
            validate_cmd: None,
        }
    }
}

impl Declaration for File {
    fn kind(&self) -> ResourceKind {
        ResourceKind::File
    }

    fn key(&self) -> &str {
        &self.path
    }

    fn artifact(&self) -> Option<Artifact> {
        let content = match (&self.content, self.ensure) {
            (Some(content), _) => content.clone(),
            (None, Ensure::Present) => String::new(),
            (None, _) => return None,
        };
        Some(Artifact::File {
            path: self.path.clone(),
            content,
            mode: self.mode.clone(),
        })
    }
}
