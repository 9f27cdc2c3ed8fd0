//! CLI definition.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use slap_config::ConfigError;
use slap_core::Application;
use slap_project::{ProjectError, Repository};
use tracing::debug;

use crate::commands;

/// Project automation for single projects and monorepos.
///
/// Subcommands are contributed by plugins.
#[derive(Debug, Default, Parser)]
#[command(name = "slap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if slap was started in DIR
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

impl Cli {
    /// Reads the global options before the plugin commands are known.
    ///
    /// Never fails; problems are reported by the full parse.
    pub fn pre_parse(args: &[OsString]) -> Self {
        let command = Self::command()
            .allow_external_subcommands(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .ignore_errors(true);

        let mut cli = command
            .try_get_matches_from(args)
            .ok()
            .and_then(|matches| Self::from_arg_matches(&matches).ok())
            .unwrap_or_default();

        // -v is global and may follow the subcommand
        cli.verbose |= args
            .iter()
            .skip(1)
            .any(|arg| arg == "-v" || arg == "--verbose");
        cli
    }

    /// Loads the repository, activates the plugins and runs the selected
    /// command.
    pub fn run(self, args: Vec<OsString>) -> Result<i32> {
        let cwd = match &self.directory {
            Some(dir) => dir
                .canonicalize()
                .with_context(|| format!("cannot change to directory {}", dir.display()))?,
            None => std::env::current_dir().context("failed to get the current directory")?,
        };

        let repository = match Repository::discover(&cwd) {
            Ok(repository) => repository,
            Err(ProjectError::Config(ConfigError::NotFound(_))) => {
                debug!(cwd = %cwd.display(), "no configuration found");
                Repository::empty(cwd.clone())
            }
            Err(err) => return Err(err).context("failed to load the project configuration"),
        };

        let plugins = commands::builtin_plugins().context("failed to register plugins")?;
        let mut app = Application::new(repository, plugins, cwd);
        app.activate().context("failed to activate plugins")?;

        let cli = app.cli(
            Self::command()
                .subcommand_required(true)
                .arg_required_else_help(true),
        );
        let matches = cli.get_matches_from(args);
        app.dispatch(&matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_pre_parse_directory() {
        let cli = Cli::pre_parse(&args(&["slap", "-C", "/tmp", "check"]));
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp")));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_pre_parse_verbose_after_subcommand() {
        let cli = Cli::pre_parse(&args(&["slap", "release", "patch", "--verbose"]));
        assert!(cli.verbose);
        assert!(cli.directory.is_none());
    }

    #[test]
    fn test_pre_parse_ignores_help() {
        let cli = Cli::pre_parse(&args(&["slap", "--help"]));
        assert!(!cli.verbose);
    }
}
