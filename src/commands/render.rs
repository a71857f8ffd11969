//! Render command implementation.
//!
//! Stages every generated artifact under a destination directory, re-rooting
//! absolute resource paths, so the exact bytes the convergence engine would
//! install can be inspected or diffed. Ownership is not applied; modes are.
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::cli::{GlobalOpts, RenderOpts};
use crate::error::RenderError;
use crate::exec::Executor;
use crate::logging::{Log, Logger, StepStatus};
use crate::resolver;
use crate::resources::{Artifact, Declaration as _, ManagedResource};

/// Placeholder in a validation command replaced by the staged file path.
const PATH_PLACEHOLDER: char = '%';

/// Run the render command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or resolved, an
/// artifact cannot be staged, or (with `--validate`) a validation command
/// rejects the staged content.
pub fn run(
    global: &GlobalOpts,
    opts: &RenderOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let config = super::load_configuration(global, log)?;

    log.stage("Resolving resources");
    let plan = resolver::plan(&config)?;

    log.stage(&format!("Staging under {}", opts.dest.display()));
    stage(&plan.resources, &opts.dest, log)?;

    if opts.validate {
        log.stage("Validating staged files");
        let result = validate_all(&plan.resources, &opts.dest, log, executor);
        log.print_summary();
        return result.map_err(Into::into);
    }

    log.print_summary();
    Ok(())
}

/// Location of `path` once re-rooted under `dest`.
///
/// # Errors
///
/// Returns [`RenderError::EscapesDestination`] if `path` contains `..` (or
/// any other non-normal component) and could resolve outside `dest`.
pub fn staged_path(dest: &Path, path: &str) -> Result<PathBuf, RenderError> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(RenderError::EscapesDestination {
            path: path.to_string(),
        });
    }
    Ok(dest.join(relative))
}

/// Write every artifact of `resources` under `dest`, recording one step per
/// file-like resource.
///
/// Every target is checked before anything is written, so a rejected path
/// leaves `dest` untouched.
///
/// # Errors
///
/// Returns [`RenderError::EscapesDestination`] if an artifact path leaves
/// `dest`, [`RenderError::Io`] if a directory or file cannot be written, and
/// [`RenderError::InvalidMode`] if a declared mode is not octal.
pub fn stage(
    resources: &[ManagedResource],
    dest: &Path,
    log: &dyn Log,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut pending = Vec::new();
    for resource in resources {
        let description = resource.description();
        let Some(artifact) = resource.artifact() else {
            if matches!(resource, ManagedResource::File(_)) {
                log.record_step(&description, StepStatus::Skipped, Some("content unmanaged"));
            } else {
                log.debug(&format!("{description}: nothing to stage"));
            }
            continue;
        };
        let target = staged_path(dest, artifact.path())?;
        pending.push((description, artifact, target));
    }

    let mut staged = Vec::new();
    for (description, artifact, target) in pending {
        match &artifact {
            Artifact::Directory { path, mode } => {
                create_dir(&target)?;
                apply_mode(&target, path, mode)?;
            }
            Artifact::File {
                path,
                content,
                mode,
            } => {
                if let Some(parent) = target.parent() {
                    create_dir(parent)?;
                }
                fs::write(&target, content).map_err(|source| RenderError::Io {
                    path: target.clone(),
                    source,
                })?;
                apply_mode(&target, path, mode)?;
            }
        }

        log.debug(&format!("staged {}", target.display()));
        log.record_step(&description, StepStatus::Ok, None);
        staged.push(target);
    }

    Ok(staged)
}

/// Run the validation command of every staged file that declares one.
fn validate_all(
    resources: &[ManagedResource],
    dest: &Path,
    log: &dyn Log,
    executor: &dyn Executor,
) -> Result<(), RenderError> {
    for resource in resources {
        let ManagedResource::File(file) = resource else {
            continue;
        };
        let Some(command) = &file.validate_cmd else {
            continue;
        };

        let name = format!("validate {}", file.path);
        let result = staged_path(dest, &file.path)
            .and_then(|target| validate_staged(command, &target, executor));
        match result {
            Ok(()) => log.record_step(&name, StepStatus::Ok, None),
            Err(e) => {
                log.error(&format!("{name}: {e}"));
                log.record_step(&name, StepStatus::Failed, Some(&e.to_string()));
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Split `command` into a program and arguments, substituting `path` for
/// every `%` or appending it when no placeholder is present.
///
/// Words are split on whitespace only. Quotes are not interpreted, so an
/// argument cannot contain spaces; wrap such a command in a script.
///
/// # Errors
///
/// Returns [`RenderError::EmptyValidateCommand`] if `command` has no words.
pub fn validation_command(command: &str, path: &Path) -> Result<(String, Vec<String>), RenderError> {
    let path = path.to_string_lossy();
    let mut substituted = false;
    let mut words: Vec<String> = command
        .split_whitespace()
        .map(|word| {
            if word.contains(PATH_PLACEHOLDER) {
                substituted = true;
                word.replace(PATH_PLACEHOLDER, &path)
            } else {
                word.to_string()
            }
        })
        .collect();

    if words.is_empty() {
        return Err(RenderError::EmptyValidateCommand);
    }
    if !substituted {
        words.push(path.into_owned());
    }

    let program = words.remove(0);
    Ok((program, words))
}

/// Run `command` against the staged file at `path`.
///
/// # Errors
///
/// Returns [`RenderError::ValidationFailed`] if the command cannot be spawned
/// or exits non-zero.
pub fn validate_staged(
    command: &str,
    path: &Path,
    executor: &dyn Executor,
) -> Result<(), RenderError> {
    let (program, args) = validation_command(command, path)?;
    let command_line = std::iter::once(program.as_str())
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    let result = executor
        .run_unchecked(&program, &args)
        .map_err(|e| RenderError::ValidationFailed {
            command: command_line.clone(),
            exit_code: -1,
            stderr: format!("{e:#}"),
        })?;

    if result.success {
        return Ok(());
    }
    Err(RenderError::ValidationFailed {
        command: command_line,
        exit_code: result.code.unwrap_or(-1),
        stderr: result.stderr.trim().to_string(),
    })
}

fn create_dir(target: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(target).map_err(|source| RenderError::Io {
        path: target.to_path_buf(),
        source,
    })
}

/// Parse an octal mode string such as `"0640"`.
fn parse_mode(path: &str, mode: &str) -> Result<u32, RenderError> {
    u32::from_str_radix(mode, 8).map_err(|_| RenderError::InvalidMode {
        path: path.to_string(),
        mode: mode.to_string(),
    })
}

fn apply_mode(target: &Path, path: &str, mode: &str) -> Result<(), RenderError> {
    let bits = parse_mode(path, mode)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        fs::set_permissions(target, fs::Permissions::from_mode(bits)).map_err(|source| {
            RenderError::Io {
                path: target.to_path_buf(),
                source,
            }
        })?;
    }
    #[cfg(not(unix))]
    let _ = (target, bits);

    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::exec::{ExecResult, MockExecutor};
    use crate::logging::RecordingLog;

    fn exec_result(success: bool, code: i32, stderr: &str) -> ExecResult {
        ExecResult {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success,
            code: Some(code),
        }
    }

    #[test]
    fn staged_path_strips_leading_slash() {
        assert_eq!(
            staged_path(Path::new("/tmp/stage"), "/etc/mimir/config.yml").unwrap(),
            PathBuf::from("/tmp/stage/etc/mimir/config.yml")
        );
    }

    #[test]
    fn placeholder_is_substituted() {
        let (program, args) =
            validation_command("/usr/bin/mimir --config=% --check", Path::new("/s/config.yml"))
                .unwrap();
        assert_eq!(program, "/usr/bin/mimir");
        assert_eq!(args, ["--config=/s/config.yml", "--check"]);
    }

    #[test]
    fn path_is_appended_without_placeholder() {
        let (program, args) =
            validation_command("/usr/bin/mimir --modules=true", Path::new("/s/config.yml"))
                .unwrap();
        assert_eq!(program, "/usr/bin/mimir");
        assert_eq!(args, ["--modules=true", "/s/config.yml"]);
    }

    #[test]
    fn blank_command_is_rejected() {
        assert!(matches!(
            validation_command("   ", Path::new("/s/config.yml")),
            Err(RenderError::EmptyValidateCommand)
        ));
    }

    #[test]
    fn invalid_mode_is_rejected() {
        assert!(matches!(
            parse_mode("/etc/mimir", "rwx"),
            Err(RenderError::InvalidMode { .. })
        ));
        assert_eq!(parse_mode("/etc/mimir", "0750").unwrap(), 0o750);
    }

    #[test]
    fn validation_success() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked()
            .times(1)
            .returning(|program, args| {
                assert_eq!(program, "mimir-check");
                assert_eq!(args, ["/s/config.yml".to_string()]);
                Ok(exec_result(true, 0, ""))
            });
        assert!(validate_staged("mimir-check", Path::new("/s/config.yml"), &executor).is_ok());
    }

    #[test]
    fn validation_failure_carries_exit_code_and_stderr() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked()
            .returning(|_, _| Ok(exec_result(false, 3, "bad yaml\n")));
        let err = validate_staged("mimir-check -f", Path::new("/s/c.yml"), &executor).unwrap_err();
        match err {
            RenderError::ValidationFailed {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "mimir-check -f /s/c.yml");
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "bad yaml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stage_writes_generated_files() {
        let dest = tempfile::tempdir().unwrap();
        let config = Configuration {
            log_to_file: true,
            ..Configuration::default()
        };
        let resources = resolver::resolve(&config).unwrap();
        let log = Logger::new();
        stage(&resources, dest.path(), &log).unwrap();

        let config_yml = fs::read_to_string(dest.path().join("etc/mimir/config.yml")).unwrap();
        assert_eq!(config_yml, "--- {}\n");
        let dropin = fs::read_to_string(
            dest.path()
                .join("etc/systemd/system/mimir.service.d/mimir-dropin.conf"),
        )
        .unwrap();
        assert!(dropin.contains("StandardOutput=append:/var/log/mimir/mimir.log"));
        assert!(dest.path().join("etc/logrotate.d/mimir").is_file());
        assert!(dest.path().join("var/log/mimir/mimir.log").is_file());
        assert!(!dest.path().join("etc/default/mimir").exists());

        let skipped: Vec<_> = log
            .steps()
            .into_iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "File[/etc/default/mimir]");
    }

    #[cfg(unix)]
    #[test]
    fn stage_applies_modes() {
        use std::os::unix::fs::PermissionsExt as _;

        let dest = tempfile::tempdir().unwrap();
        let resources = resolver::resolve(&Configuration::default()).unwrap();
        stage(&resources, dest.path(), &Logger::new()).unwrap();

        let mode = fs::metadata(dest.path().join("etc/mimir/config.yml"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
        let dir_mode = fs::metadata(dest.path().join("etc/mimir"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o750);
    }

    #[test]
    fn validate_all_stops_at_first_failure() {
        let dest = tempfile::tempdir().unwrap();
        let resources = resolver::resolve(&Configuration::default()).unwrap();
        let log = Logger::new();
        stage(&resources, dest.path(), &log).unwrap();

        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked()
            .times(1)
            .returning(|_, _| Ok(exec_result(false, 1, "invalid")));
        assert!(validate_all(&resources, dest.path(), &log, &executor).is_err());
        assert_eq!(log.failure_count(), 1);
    }

    #[test]
    fn parent_components_are_rejected() {
        for path in ["/var/log/../../etc/shadow", "../escaped.log", "/etc/mimir/.."] {
            assert!(
                matches!(
                    staged_path(Path::new("/tmp/stage"), path),
                    Err(RenderError::EscapesDestination { .. })
                ),
                "{path} must not be staged"
            );
        }
        assert_eq!(
            staged_path(Path::new("/tmp/stage"), "/etc/./mimir").unwrap(),
            PathBuf::from("/tmp/stage/etc/mimir")
        );
    }

    #[test]
    fn escaping_log_file_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("stage");
        let config = Configuration {
            log_to_file: true,
            log_file_path: "../../../../escaped.log".to_string(),
            ..Configuration::default()
        };
        let resources = resolver::resolve(&config).unwrap();

        let err = stage(&resources, &dest, &Logger::new()).unwrap_err();
        assert!(matches!(err, RenderError::EscapesDestination { .. }));
        assert!(!dest.exists(), "nothing may be staged before the check");
        assert!(!root.path().join("escaped.log").exists());
    }

    #[test]
    fn validation_failure_is_logged_as_error() {
        let dest = tempfile::tempdir().unwrap();
        let resources = resolver::resolve(&Configuration::default()).unwrap();
        stage(&resources, dest.path(), &Logger::new()).unwrap();

        let log = RecordingLog::default();
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked()
            .returning(|_, _| Ok(exec_result(false, 2, "unknown field")));
        assert!(validate_all(&resources, dest.path(), &log, &executor).is_err());

        let errors = log.messages("error");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("validate /etc/mimir/config.yml: "));
        assert!(errors[0].contains("unknown field"));
    }

    #[test]
    fn quotes_are_not_interpreted() {
        let (program, args) =
            validation_command("check --name='a b'", Path::new("/s/config.yml")).unwrap();
        assert_eq!(program, "check");
        assert_eq!(args, ["--name='a", "b'", "/s/config.yml"]);
    }
}
