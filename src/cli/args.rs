//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::resolver::StrategyKind;

/// Upkeep - keep components installed from hosted repositories up to date.
#[derive(Debug, Parser)]
#[command(name = "upkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.upkeep/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding state files (overrides ~/.upkeep)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Directory holding installed components
    #[arg(long, global = true)]
    pub install_root: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check every tracked component and publish available updates
    Check(CheckArgs),

    /// Install the updates published by the last check
    Apply(ApplyArgs),

    /// Install a component from a repository and start tracking it
    Install(InstallArgs),

    /// Reinstall a tracked component from its latest remote version
    Reinstall(ReinstallArgs),

    /// Inspect or edit the component registry
    #[command(subcommand)]
    Registry(RegistryCommand),

    /// Show the activity log
    Log(LogArgs),

    /// Manage the stored access token
    #[command(subcommand)]
    Token(TokenCommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `apply` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ApplyArgs {
    /// Run a check first instead of using the last published updates
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Repository as owner/repo or a repository URL
    pub repo: String,

    /// Directory name under the install root
    #[arg(long)]
    pub slug: String,

    /// Branch to install from
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Registry name (defaults to the slug)
    #[arg(long)]
    pub name: Option<String>,

    /// Replace an existing directory
    #[arg(short, long)]
    pub force: bool,

    /// Version resolution strategy for this component
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// File carrying the version header (header strategy)
    #[arg(long)]
    pub entry_file: Option<String>,
}

/// Arguments for the `reinstall` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ReinstallArgs {
    /// Registry name of the component
    pub name: String,

    /// Repository to pick when the name is tracked more than once
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Registry subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum RegistryCommand {
    /// List tracked components
    List(RegistryListArgs),

    /// Track a component, or update an existing entry
    #[command(disable_version_flag = true)]
    Add(RegistryAddArgs),

    /// Stop tracking a component
    Remove(RegistryRemoveArgs),

    /// Replace the whole registry from a YAML list
    Import(RegistryImportArgs),
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct RegistryListArgs {
    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RegistryAddArgs {
    /// Registry name
    pub name: String,

    /// Repository as owner/repo or a repository URL
    pub repo: String,

    /// Branch to track
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Last known version identifier
    #[arg(long)]
    pub version: Option<String>,

    /// Version resolution strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// File carrying the version header (header strategy)
    #[arg(long)]
    pub entry_file: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RegistryRemoveArgs {
    /// Registry name
    pub name: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RegistryImportArgs {
    /// YAML file with a list of `{plugin, repo, branch}` rows
    pub file: PathBuf,
}

/// Arguments for the `log` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LogArgs {
    /// Remove every entry
    #[arg(long)]
    pub clear: bool,

    /// Show at most this many entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Token subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TokenCommand {
    /// Store an access token
    Set(TokenSetArgs),

    /// Remove the stored token
    Clear,

    /// Show whether a token is configured
    Status,
}

#[derive(Debug, Clone, clap::Args)]
pub struct TokenSetArgs {
    /// The token value
    pub value: String,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_install_with_flags() {
        let cli = Cli::parse_from([
            "upkeep",
            "install",
            "acme/widget",
            "--slug",
            "widget",
            "--branch",
            "develop",
            "--force",
            "--strategy",
            "release",
        ]);
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.repo, "acme/widget");
                assert_eq!(args.slug, "widget");
                assert_eq!(args.branch.as_deref(), Some("develop"));
                assert!(args.force);
                assert_eq!(args.strategy, Some(StrategyKind::Release));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["upkeep", "check", "--state-dir", "/tmp/s", "--quiet"]);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/s")));
        assert!(cli.quiet);
    }

    #[test]
    fn install_requires_slug() {
        assert!(Cli::try_parse_from(["upkeep", "install", "acme/widget"]).is_err());
    }

    #[test]
    fn parses_registry_and_token_subcommands() {
        let cli = Cli::parse_from(["upkeep", "registry", "remove", "widget"]);
        assert!(matches!(
            cli.command,
            Commands::Registry(RegistryCommand::Remove(ref a)) if a.name == "widget"
        ));

        let cli = Cli::parse_from(["upkeep", "token", "clear"]);
        assert!(matches!(cli.command, Commands::Token(TokenCommand::Clear)));
    }
}
