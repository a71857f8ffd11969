//! Desired package state.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Desired state of the `mimir` package.
///
/// Written in the configuration file as a plain string: `"present"`
/// (alias `"installed"`), `"latest"`, or an exact version.
///
/// # Examples
///
/// ```
/// use mimir_state::config::package_ensure::PackageEnsure;
///
/// let ensure: PackageEnsure = "2.10.3".parse().unwrap();
/// assert_eq!(ensure, PackageEnsure::Version("2.10.3".to_string()));
/// assert_eq!("latest".parse::<PackageEnsure>().unwrap(), PackageEnsure::Latest);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackageEnsure {
    /// Any installed version is acceptable.
    #[default]
    Present,
    /// Track the newest version available to the package manager.
    Latest,
    /// Pin an exact version.
    Version(String),
}

/// Returned when `package_ensure` is an empty string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("package_ensure must be 'present', 'latest', or a version string, got an empty value")]
pub struct EmptyPackageEnsure;

impl std::str::FromStr for PackageEnsure {
    type Err = EmptyPackageEnsure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(EmptyPackageEnsure),
            "present" | "installed" => Ok(Self::Present),
            "latest" => Ok(Self::Latest),
            version => Ok(Self::Version(version.to_string())),
        }
    }
}

impl TryFrom<String> for PackageEnsure {
    type Error = EmptyPackageEnsure;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageEnsure> for String {
    fn from(value: PackageEnsure) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PackageEnsure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Latest => f.write_str("latest"),
            Self::Version(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn installed_is_an_alias_for_present() {
        assert_eq!(
            "installed".parse::<PackageEnsure>().unwrap(),
            PackageEnsure::Present
        );
    }

    #[test]
    fn empty_value_is_rejected() {
        assert_eq!("  ".parse::<PackageEnsure>(), Err(EmptyPackageEnsure));
    }

    #[test]
    fn display_matches_configured_text() {
        assert_eq!(PackageEnsure::Present.to_string(), "present");
        assert_eq!(PackageEnsure::Latest.to_string(), "latest");
        assert_eq!(
            PackageEnsure::Version("2.10.3-1".to_string()).to_string(),
            "2.10.3-1"
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&PackageEnsure::Latest).unwrap();
        assert_eq!(json, "\"latest\"");
    }
}
