//! YAML document rendering for `config.yml`.
use serde_yaml_ng::Mapping;

use crate::error::RenderError;

/// Document emitted when no configuration is supplied.
pub const EMPTY_DOCUMENT: &str = "--- {}\n";

/// Render `hash` as a YAML document with an explicit `---` header.
///
/// An absent or empty mapping renders as [`EMPTY_DOCUMENT`]; anything else
/// renders in block style, keys in insertion order.
///
/// # Examples
///
/// ```
/// use mimir_state::resources::yaml::render_document;
/// use serde_yaml_ng::{Mapping, Value};
///
/// let mut hash = Mapping::new();
/// hash.insert(Value::from("test"), Value::from("test"));
///
/// assert_eq!(render_document(Some(&hash)).unwrap(), "---\ntest: test\n");
/// assert_eq!(render_document(None).unwrap(), "--- {}\n");
/// ```
///
/// # Errors
///
/// Returns [`RenderError::Serialize`] if a value cannot be represented in YAML.
pub fn render_document(hash: Option<&Mapping>) -> Result<String, RenderError> {
    match hash {
        None => Ok(EMPTY_DOCUMENT.to_string()),
        Some(hash) if hash.is_empty() => Ok(EMPTY_DOCUMENT.to_string()),
        Some(hash) => {
            let body =
                serde_yaml_ng::to_string(hash).map_err(|e| RenderError::Serialize(e.to_string()))?;
            Ok(format!("---\n{body}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_yaml_ng::Value;

    #[test]
    fn empty_mapping_renders_empty_document() {
        assert_eq!(render_document(Some(&Mapping::new())).unwrap(), "--- {}\n");
    }

    #[test]
    fn nested_values_render_in_block_style() {
        let mut server = Mapping::new();
        server.insert(Value::from("http_listen_port"), Value::from(9009_u32));
        let mut hash = Mapping::new();
        hash.insert(Value::from("target"), Value::from("all"));
        hash.insert(Value::from("server"), Value::Mapping(server));

        assert_eq!(
            render_document(Some(&hash)).unwrap(),
            "---\ntarget: all\nserver:\n  http_listen_port: 9009\n"
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let mut hash = Mapping::new();
        hash.insert(Value::from("zeta"), Value::from(true));
        hash.insert(Value::from("alpha"), Value::from(false));
        assert_eq!(
            render_document(Some(&hash)).unwrap(),
            "---\nzeta: true\nalpha: false\n"
        );
    }
}
