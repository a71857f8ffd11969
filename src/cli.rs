//! Command-line argument definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_PATH;

/// Top-level CLI entry point for the mimir desired-state resolver.
#[derive(Parser, Debug)]
#[command(
    name = "mimir-state",
    about = "Desired-state resolver for the mimir system service",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file (TOML); a missing file means all defaults
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the configuration and print the resulting plan
    Plan(PlanOpts),
    /// Validate the configuration without printing resources
    Check,
    /// Stage generated files under a destination directory
    Render(RenderOpts),
    /// Print version information
    Version,
}

/// Output format of the `plan` subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    /// One resource per line with content digests.
    #[default]
    Text,
    /// The serialized plan.
    Json,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Output format
    #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
    pub format: PlanFormat,
}

/// Options for the `render` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RenderOpts {
    /// Staging root; absolute resource paths are re-rooted under it
    #[arg(long)]
    pub dest: PathBuf,

    /// Run the configured validation command against the staged config.yml
    #[arg(long)]
    pub validate: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_defaults_to_etc() {
        let cli = Cli::parse_from(["mimir-state", "check"]);
        assert_eq!(cli.global.config, PathBuf::from("/etc/mimir-state.toml"));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_config_short() {
        let cli = Cli::parse_from(["mimir-state", "-c", "/tmp/mimir.toml", "plan"]);
        assert_eq!(cli.global.config, PathBuf::from("/tmp/mimir.toml"));
    }

    #[test]
    fn plan_defaults_to_text() {
        let cli = Cli::parse_from(["mimir-state", "plan"]);
        assert!(
            matches!(&cli.command, Command::Plan(opts) if opts.format == PlanFormat::Text),
            "expected text plan"
        );
    }

    #[test]
    fn parse_plan_json() {
        let cli = Cli::parse_from(["mimir-state", "plan", "--format", "json"]);
        assert!(
            matches!(&cli.command, Command::Plan(opts) if opts.format == PlanFormat::Json),
            "expected json plan"
        );
    }

    #[test]
    fn render_requires_dest() {
        assert!(Cli::try_parse_from(["mimir-state", "render"]).is_err());
    }

    #[test]
    fn parse_render_with_validation() {
        let cli = Cli::parse_from(["mimir-state", "render", "--dest", "/tmp/stage", "--validate"]);
        assert!(
            matches!(&cli.command, Command::Render(_)),
            "expected render command"
        );
        if let Command::Render(opts) = cli.command {
            assert_eq!(opts.dest, PathBuf::from("/tmp/stage"));
            assert!(opts.validate);
        }
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["mimir-state", "plan", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["mimir-state", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
