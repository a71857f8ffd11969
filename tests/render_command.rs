#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Integration tests for the `render` command.
//!
//! These tests stage the resolved artifacts of a temporary configuration
//! into a temporary directory, verifying that:
//! - generated files land at their re-rooted paths with exact content
//! - unmanaged files are never written
//! - `--validate` runs the configured command against the staged config

mod common;

use mimir_state::cli::RenderOpts;
use mimir_state::commands::render;
use mimir_state::exec::SystemExecutor;
use mimir_state::logging::{Logger, StepStatus};

fn opts(ctx: &common::IntegrationTestContext, validate: bool) -> RenderOpts {
    RenderOpts {
        dest: ctx.stage_dir(),
        validate,
    }
}

#[test]
fn render_not_defaults_stages_generated_files() {
    let ctx = common::IntegrationTestContext::with_config(common::NOT_DEFAULTS_TOML);
    let log = Logger::new();
    render::run(&ctx.global(), &opts(&ctx, false), &log, &SystemExecutor).unwrap();

    let stage = ctx.stage_dir();
    assert_eq!(
        common::read_staged(&stage, "/test/config/config.yml"),
        "---\ntest: test\n"
    );
    assert_eq!(
        common::read_staged(
            &stage,
            "/etc/systemd/system/mimir.service.d/mimir-dropin.conf"
        ),
        "# MANAGED BY PUPPET\n[Service]\nLimitNOFILE=42\nAdditionalTestKey=test\n\
         StandardOutput=append:/test/log/mimir-test.log\nStandardError=inherit\n"
    );
    assert!(
        common::read_staged(&stage, "/etc/logrotate.d/mimir")
            .contains("/test/log/mimir-test.log {")
    );
    assert_eq!(common::read_staged(&stage, "/test/log/mimir-test.log"), "");
    assert!(!stage.join("etc/default/mimir").exists());
    assert_eq!(log.failure_count(), 0);
}

#[test]
fn render_defaults_without_config_file() {
    let ctx = common::IntegrationTestContext::empty();
    render::run(&ctx.global(), &opts(&ctx, false), &Logger::new(), &SystemExecutor).unwrap();

    let stage = ctx.stage_dir();
    assert_eq!(common::read_staged(&stage, "/etc/mimir/config.yml"), "--- {}\n");
    assert!(!stage.join("var/log/mimir").exists());
}

#[test]
fn render_refuses_colliding_configuration() {
    let ctx = common::IntegrationTestContext::with_config(
        "log_to_file = true\n\n[systemd_overrides.Service]\nStandardError = \"journal\"\n",
    );
    let err = render::run(&ctx.global(), &opts(&ctx, false), &Logger::new(), &SystemExecutor)
        .unwrap_err();
    assert!(err.to_string().contains("log_to_file option is not compatible"));
    assert!(!ctx.stage_dir().exists(), "nothing may be staged");
}

#[cfg(unix)]
#[test]
fn validate_accepts_with_passing_command() {
    let ctx = common::IntegrationTestContext::with_config("validate_cmd = \"true\"\n");
    let log = Logger::new();
    render::run(&ctx.global(), &opts(&ctx, true), &log, &SystemExecutor).unwrap();

    let validated = log
        .steps()
        .into_iter()
        .find(|s| s.name == "validate /etc/mimir/config.yml")
        .expect("validation step recorded");
    assert_eq!(validated.status, StepStatus::Ok);
}

#[cfg(unix)]
#[test]
fn validate_rejects_with_failing_command() {
    let ctx = common::IntegrationTestContext::with_config("validate_cmd = \"false\"\n");
    let log = Logger::new();
    let err = render::run(&ctx.global(), &opts(&ctx, true), &log, &SystemExecutor).unwrap_err();
    assert!(err.to_string().contains("Validation command"));
    assert_eq!(log.failure_count(), 1);
}
