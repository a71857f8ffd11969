//! Ordered systemd override sections.
//!
//! Override keys are rendered into the drop-in in the order they were
//! written, so they are kept in plain vectors instead of hash maps.
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// Name of the unit section that process output keys live in.
pub const SERVICE_SECTION: &str = "Service";

/// A single `[Section]` of systemd overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSection {
    /// Section name without brackets (e.g., `"Service"`).
    pub name: String,
    /// `Key=Value` pairs in the order they were supplied.
    pub entries: Vec<(String, String)>,
}

impl OverrideSection {
    /// Return the value set for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is set in this section.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Systemd unit overrides, keyed by section then by directive.
///
/// # Examples
///
/// ```
/// use mimir_state::config::overrides::SystemdOverrides;
///
/// let overrides = SystemdOverrides::default()
///     .with("Service", "LimitNOFILE", "42")
///     .with("Service", "AdditionalTestKey", "test");
///
/// let service = overrides.service().unwrap();
/// assert_eq!(service.entries[0], ("LimitNOFILE".to_string(), "42".to_string()));
/// assert_eq!(service.get("AdditionalTestKey"), Some("test"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemdOverrides {
    sections: Vec<OverrideSection>,
}

impl SystemdOverrides {
    /// Set `key` to `value` in `section`, keeping the position of an
    /// existing key and appending new sections and keys at the end.
    #[must_use]
    pub fn with(mut self, section: &str, key: &str, value: &str) -> Self {
        let idx = match self.sections.iter().position(|s| s.name == section) {
            Some(idx) => idx,
            None => {
                self.sections.push(OverrideSection {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        if let Some(target) = self.sections.get_mut(idx) {
            match target.entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => target.entries.push((key.to_string(), value.to_string())),
            }
        }
        self
    }

    /// Look up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&OverrideSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// The `[Service]` section, if present.
    #[must_use]
    pub fn service(&self) -> Option<&OverrideSection> {
        self.section(SERVICE_SECTION)
    }

    /// Iterate over all sections in supplied order.
    pub fn sections(&self) -> impl Iterator<Item = &OverrideSection> {
        self.sections.iter()
    }
}

/// Textual form of a scalar override value.
struct OverrideValue(String);

impl<'de> Deserialize<'de> for OverrideValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl Visitor<'_> for ValueVisitor {
            type Value = OverrideValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(OverrideValue(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(OverrideValue(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(OverrideValue(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(OverrideValue(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(OverrideValue(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(OverrideValue(v.to_string()))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Entries of one section, in document order.
struct SectionEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for SectionEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = SectionEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of systemd directives")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, OverrideValue>()? {
                    entries.push((key, value.0));
                }
                Ok(SectionEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<'de> Deserialize<'de> for SystemdOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OverridesVisitor;

        impl<'de> Visitor<'de> for OverridesVisitor {
            type Value = SystemdOverrides;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of systemd unit sections")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::new();
                while let Some((name, entries)) = map.next_entry::<String, SectionEntries>()? {
                    sections.push(OverrideSection {
                        name,
                        entries: entries.0,
                    });
                }
                Ok(SystemdOverrides { sections })
            }
        }

        deserializer.deserialize_map(OverridesVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        overrides: SystemdOverrides,
    }

    fn parse(toml_src: &str) -> SystemdOverrides {
        toml::from_str::<Wrapper>(toml_src).unwrap().overrides
    }

    #[test]
    fn keeps_document_order() {
        let overrides = parse(
            r#"[overrides.Service]
Zeta = "z"
Alpha = "a"
Middle = "m"
"#,
        );
        let keys: Vec<&str> = overrides
            .service()
            .unwrap()
            .entries
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Middle"]);
    }

    #[test]
    fn scalars_render_as_text() {
        let overrides = parse(
            r"[overrides.Service]
LimitNOFILE = 42
Restart = true
CPUWeight = 1.5
",
        );
        let service = overrides.service().unwrap();
        assert_eq!(service.get("LimitNOFILE"), Some("42"));
        assert_eq!(service.get("Restart"), Some("true"));
        assert_eq!(service.get("CPUWeight"), Some("1.5"));
    }

    #[test]
    fn nested_values_are_rejected() {
        let result = toml::from_str::<Wrapper>(
            r"[overrides.Service]
Environment = [1, 2]
",
        );
        assert!(result.is_err());
    }

    #[test]
    fn sections_keep_order() {
        let overrides = parse(
            r#"[overrides.Unit]
After = "network-online.target"

[overrides.Service]
Nice = 5
"#,
        );
        let names: Vec<&str> = overrides.sections().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Unit", "Service"]);
    }

    #[test]
    fn with_replaces_existing_key_in_place() {
        let overrides = SystemdOverrides::default()
            .with("Service", "A", "1")
            .with("Service", "B", "2")
            .with("Service", "A", "3");
        let service = overrides.service().unwrap();
        assert_eq!(
            service.entries,
            vec![
                ("A".to_string(), "3".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn missing_service_section() {
        let overrides = SystemdOverrides::default().with("Unit", "After", "x");
        assert!(overrides.service().is_none());
        assert_eq!(overrides.sections().count(), 1);
    }
}
