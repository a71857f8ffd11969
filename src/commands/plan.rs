//! Plan command implementation.
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};

use crate::cli::{GlobalOpts, PlanFormat, PlanOpts};
use crate::logging::Logger;
use crate::resolver::{self, Plan};
use crate::resources::{Artifact, Declaration as _};

/// Run the plan command, writing the resolved plan to stdout.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, fails validation,
/// or the plan cannot be written.
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Logger) -> Result<()> {
    let config = super::load_configuration(global, log)?;

    log.stage("Resolving resources");
    let plan = resolver::plan(&config)?;
    log.info(&format!("{} resources", plan.resources.len()));

    let mut stdout = std::io::stdout().lock();
    write_plan(&plan, opts.format, &mut stdout)
}

/// Write `plan` in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_plan(plan: &Plan, format: PlanFormat, out: &mut impl Write) -> Result<()> {
    let rendered = match format {
        PlanFormat::Text => format_text(plan),
        PlanFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(plan).context("failed to serialize plan")?;
            json.push('\n');
            json
        }
    };
    out.write_all(rendered.as_bytes())
        .context("failed to write plan")
}

/// One line per resource, with the SHA-256 of rendered file content, followed
/// by the restart relationships and extra service arguments.
#[must_use]
pub fn format_text(plan: &Plan) -> String {
    let mut text = String::new();
    for resource in &plan.resources {
        let description = resource.description();
        match resource.artifact() {
            Some(Artifact::File { content, mode, .. }) => {
                let _ = writeln!(
                    text,
                    "{description} mode={mode} sha256={}",
                    content_digest(&content)
                );
            }
            Some(Artifact::Directory { mode, .. }) => {
                let _ = writeln!(text, "{description} mode={mode}");
            }
            None => {
                let _ = writeln!(text, "{description}");
            }
        }
    }
    for trigger in &plan.restart_triggers {
        let _ = writeln!(text, "{trigger} ~> Service[mimir]");
    }
    if !plan.custom_args.is_empty() {
        let _ = writeln!(text, "custom_args: {}", plan.custom_args.join(" "));
    }
    text
}

/// Lowercase hex SHA-256 digest of `content`.
fn content_digest(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn digest_of_empty_document() {
        assert_eq!(
            content_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn text_lists_every_resource_in_order() {
        let plan = resolver::plan(&Configuration::default()).unwrap();
        let text = format_text(&plan);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), plan.resources.len());
        assert_eq!(lines[0], "Package[mimir]");
        assert_eq!(lines[1], "Directory[/etc/mimir] mode=0750");
        assert!(lines[2].starts_with("File[/etc/mimir/config.yml] mode=0640 sha256="));
        assert_eq!(lines[3], "File[/etc/default/mimir]");
        assert_eq!(lines.last().copied(), Some("Service[mimir]"));
    }

    #[test]
    fn text_includes_restart_triggers_and_args() {
        let config = Configuration {
            restart_on_change: true,
            custom_args: vec!["-a".to_string(), "-b".to_string()],
            ..Configuration::default()
        };
        let text = format_text(&resolver::plan(&config).unwrap());
        assert!(text.contains("SystemdDropin[mimir-dropin.conf] ~> Service[mimir]\n"));
        assert!(text.ends_with("custom_args: -a -b\n"));
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let plan = resolver::plan(&Configuration::default()).unwrap();
        let mut out = Vec::new();
        write_plan(&plan, PlanFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["resources"][0]["kind"], "package");
        assert_eq!(value["resources"][0]["ensure"], "present");
        assert_eq!(value["restart_triggers"], serde_json::json!([]));
    }
}
