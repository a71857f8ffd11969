//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load a TOML file into `T`.
///
/// A missing file is not an error: it deserializes from an empty document so
/// every `#[serde(default)]` field takes its default value.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::Parse`] if it is not valid TOML or does not match `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return parse_str("", path);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_str(&content, path)
}

/// Parse TOML `content`, attributing errors to `origin`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the content does not deserialize into `T`.
pub fn parse_str<T: DeserializeOwned>(content: &str, origin: &Path) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_path_buf(),
        message: e.to_string().trim_end().to_string(),
    })
}
