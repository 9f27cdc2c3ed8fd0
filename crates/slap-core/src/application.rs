//! The application hosting plugins and commands.

use std::path::PathBuf;

use anyhow::bail;
use clap::ArgMatches;
use slap_plugin::{CommandContext, CommandRegistry, PluginRegistry};
use slap_project::Repository;
use tracing::debug;

use crate::CoreResult;

/// The Slap application.
///
/// Owns the loaded repository, the plugin registry and the commands that
/// application plugins registered on activation.
pub struct Application {
    repository: Repository,
    plugins: PluginRegistry,
    commands: CommandRegistry,
    git: Option<slap_git::Repository>,
    cwd: PathBuf,
}

impl Application {
    /// Creates an application for a repository.
    ///
    /// The git repository is discovered from the repository directory.
    #[must_use]
    pub fn new(repository: Repository, plugins: PluginRegistry, cwd: impl Into<PathBuf>) -> Self {
        let git = slap_git::Repository::discover(repository.directory()).ok();
        debug!(git = git.is_some(), "created application");
        Self {
            repository,
            plugins,
            commands: CommandRegistry::new(),
            git,
            cwd: cwd.into(),
        }
    }

    /// Returns the loaded repository.
    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Returns the plugin registry.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Returns the plugin registry for registration.
    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Returns the registered commands.
    #[must_use]
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Returns the git repository, if any.
    #[must_use]
    pub fn git(&self) -> Option<&slap_git::Repository> {
        self.git.as_ref()
    }

    /// Disables the plugins listed in the root project's `plugins.disable`
    /// and activates every application plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if a plugin fails to activate.
    pub fn activate(&mut self) -> CoreResult<()> {
        if let Some(root) = self.repository.root_project() {
            let disabled = root.config().plugins.disable.clone();
            self.plugins.disable(&disabled);
        }

        for plugin in self.plugins.application_plugins() {
            debug!(plugin = plugin.name(), "activating plugin");
            plugin.activate(&self.repository, &mut self.commands)?;
        }
        Ok(())
    }

    /// Adds every registered command to `base` as a subcommand.
    ///
    /// Multi-element command paths become nested subcommands.
    #[must_use]
    pub fn cli(&self, base: clap::Command) -> clap::Command {
        self.commands.iter().fold(base, |cli, command| {
            insert_command(cli, command.path(), command.definition())
        })
    }

    /// Runs the command selected in `matches`.
    ///
    /// # Errors
    ///
    /// Returns an error if no registered command was selected or the command
    /// fails.
    pub fn dispatch(&self, matches: &ArgMatches) -> anyhow::Result<i32> {
        let mut path: Vec<&str> = Vec::new();
        let mut current = matches;

        while let Some((name, sub_matches)) = current.subcommand() {
            path.push(name);
            current = sub_matches;
            if let Some(command) = self.commands.get(&path) {
                debug!(command = %path.join(" "), "dispatching");
                let ctx = CommandContext {
                    repository: &self.repository,
                    plugins: &self.plugins,
                    git: self.git.as_ref(),
                    cwd: &self.cwd,
                };
                return command.run(&ctx, current);
            }
        }

        bail!("no command given, see --help")
    }
}

fn insert_command(
    parent: clap::Command,
    path: &[&'static str],
    definition: clap::Command,
) -> clap::Command {
    match path {
        [] => parent,
        [name] => parent.subcommand(definition.name(*name)),
        [group, rest @ ..] => {
            if parent.find_subcommand(group).is_some() {
                parent.mut_subcommand(*group, |sub| insert_command(sub, rest, definition))
            } else {
                let sub = clap::Command::new(*group)
                    .subcommand_required(true)
                    .arg_required_else_help(true);
                parent.subcommand(insert_command(sub, rest, definition))
            }
        }
    }
}
