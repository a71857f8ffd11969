//! Configuration record for the mimir service and its loading.
pub mod overrides;
pub mod package_ensure;
pub mod toml_loader;

use serde::{Deserialize, Deserializer};
use serde_yaml_ng::{Mapping, Value as YamlValue};
use std::path::Path;

use crate::error::ConfigError;
use overrides::SystemdOverrides;
use package_ensure::PackageEnsure;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mimir-state.toml";

/// Desired configuration of the mimir service.
///
/// Every field has a default, so an empty (or missing) configuration file
/// describes a stock installation.
///
/// # Examples
///
/// ```
/// use mimir_state::config::Configuration;
///
/// let config = Configuration::from_toml_str("manage_user = true\n").unwrap();
/// assert!(config.manage_user);
/// assert_eq!(config.config_dir, "/etc/mimir");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Contents of `config.yml`; absent renders an empty document.
    ///
    /// TOML datetimes become YAML strings in their RFC 3339 form.
    #[serde(deserialize_with = "deserialize_config_hash")]
    pub config_hash: Option<Mapping>,
    /// Desired package state.
    pub package_ensure: PackageEnsure,
    /// Whether to declare the `mimir` system user.
    pub manage_user: bool,
    /// Home directory of the managed user.
    pub user_home: String,
    /// Login shell of the managed user.
    pub user_shell: String,
    /// Supplementary groups of the managed user.
    pub user_extra_groups: Vec<String>,
    /// Owner of the configuration directory and file.
    pub config_owner: String,
    /// Group of the configuration directory and file.
    pub config_group: String,
    /// Directory holding `config.yml`.
    pub config_dir: String,
    /// Extra command-line arguments for the service, carried through untouched.
    pub custom_args: Vec<String>,
    /// Systemd unit overrides rendered into the drop-in.
    pub systemd_overrides: Option<SystemdOverrides>,
    /// Route service output to a rotated log file.
    pub log_to_file: bool,
    /// Directory holding the log file.
    pub log_dir_path: String,
    /// Octal mode of the log directory.
    pub log_dir_mode: String,
    /// Log file name, relative to `log_dir_path`.
    pub log_file_path: String,
    /// Octal mode of the log file.
    pub log_file_mode: String,
    /// Owner of the log directory and file.
    pub log_owner: String,
    /// Group of the log directory and file.
    pub log_group: String,
    /// Command the service manager runs to restart the service.
    pub restart_cmd: String,
    /// Whether configuration changes trigger `restart_cmd`.
    pub restart_on_change: bool,
    /// Command that must accept rendered `config.yml` content.
    pub validate_cmd: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            config_hash: None,
            package_ensure: PackageEnsure::Present,
            manage_user: false,
            user_home: "/var/lib/mimir".to_string(),
            user_shell: "/sbin/nologin".to_string(),
            user_extra_groups: Vec::new(),
            config_owner: "mimir".to_string(),
            config_group: "mimir".to_string(),
            config_dir: "/etc/mimir".to_string(),
            custom_args: Vec::new(),
            systemd_overrides: None,
            log_to_file: false,
            log_dir_path: "/var/log/mimir".to_string(),
            log_dir_mode: "0750".to_string(),
            log_file_path: "mimir.log".to_string(),
            log_file_mode: "0640".to_string(),
            log_owner: "mimir".to_string(),
            log_group: "mimir".to_string(),
            restart_cmd: "/bin/systemctl reload mimir".to_string(),
            restart_on_change: false,
            validate_cmd: "/usr/local/bin/mimir --modules=true".to_string(),
        }
    }
}

impl Configuration {
    /// Load the configuration from a TOML file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not match the schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Parse the configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match the schema.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml_loader::parse_str(content, Path::new("<inline>"))
    }

    /// Full path of the rotated log file (`{log_dir_path}/{log_file_path}`).
    #[must_use]
    pub fn log_file(&self) -> String {
        format!("{}/{}", self.log_dir_path, self.log_file_path)
    }

    /// Full path of the rendered configuration file.
    #[must_use]
    pub fn config_file(&self) -> String {
        format!("{}/config.yml", self.config_dir)
    }
}

/// Read `config_hash` as a TOML table and convert it value by value, so
/// types YAML has no counterpart for never reach the YAML serializer.
fn deserialize_config_hash<'de, D>(deserializer: D) -> Result<Option<Mapping>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = Option::<toml::Table>::deserialize(deserializer)?;
    Ok(table.map(table_to_mapping))
}

fn table_to_mapping(table: toml::Table) -> Mapping {
    table
        .into_iter()
        .map(|(key, value)| (YamlValue::String(key), toml_to_yaml(value)))
        .collect()
}

fn toml_to_yaml(value: toml::Value) -> YamlValue {
    match value {
        toml::Value::String(s) => YamlValue::String(s),
        toml::Value::Integer(i) => YamlValue::from(i),
        toml::Value::Float(f) => YamlValue::from(f),
        toml::Value::Boolean(b) => YamlValue::Bool(b),
        toml::Value::Datetime(dt) => YamlValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            YamlValue::Sequence(items.into_iter().map(toml_to_yaml).collect())
        }
        toml::Value::Table(table) => YamlValue::Mapping(table_to_mapping(table)),
    }
}
