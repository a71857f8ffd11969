// Shared helpers for integration tests.
//
// Provides the two reference parameter sets as TOML and a temporary-directory
// backed context, so each integration test can load a configuration file
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mimir_state::cli::GlobalOpts;
use mimir_state::config::Configuration;

/// Every option spelled out at its default value.
pub const DEFAULTS_TOML: &str = r#"
package_ensure = "present"
manage_user = false
user_home = "/var/lib/mimir"
user_shell = "/sbin/nologin"
user_extra_groups = []
config_owner = "mimir"
config_group = "mimir"
config_dir = "/etc/mimir"
custom_args = []
log_to_file = false
restart_cmd = "/bin/systemctl reload mimir"
restart_on_change = false
validate_cmd = "/usr/local/bin/mimir --modules=true"
"#;

/// Every option moved away from its default.
pub const NOT_DEFAULTS_TOML: &str = r#"
package_ensure = "latest"
manage_user = true
user_home = "/test/home"
user_shell = "/test/bin/shell"
user_extra_groups = ["extra_test_group"]
config_owner = "test_owner"
config_group = "test_group"
config_dir = "/test/config"
custom_args = ["test_arg"]
log_dir_path = "/test/log"
log_dir_mode = "0750"
log_file_path = "mimir-test.log"
log_file_mode = "0640"
log_group = "test_group"
log_owner = "test_owner"
log_to_file = true
restart_cmd = "/test/bin/restart"
restart_on_change = true
validate_cmd = "/test/bin/validate"

[config_hash]
test = "test"

[systemd_overrides.Service]
LimitNOFILE = "42"
AdditionalTestKey = "test"
"#;

/// An isolated configuration file backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `mimir.toml` and any staging output.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context whose configuration file holds `content`.
    pub fn with_config(content: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join("mimir.toml"), content).expect("write mimir.toml");
        Self { root }
    }

    /// Create a context with no configuration file at all.
    pub fn empty() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the configuration file (which may not exist).
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("mimir.toml")
    }

    /// Staging directory inside the context.
    pub fn stage_dir(&self) -> PathBuf {
        self.root.path().join("stage")
    }

    /// Global options pointing at this context's configuration file.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            config: self.config_path(),
        }
    }

    /// Load the configuration file.
    pub fn load(&self) -> Configuration {
        Configuration::load(&self.config_path()).expect("load configuration")
    }
}

/// Read a staged file under `stage` by its absolute target path.
pub fn read_staged(stage: &Path, target: &str) -> String {
    std::fs::read_to_string(stage.join(target.trim_start_matches('/')))
        .unwrap_or_else(|e| panic!("read staged {target}: {e}"))
}
