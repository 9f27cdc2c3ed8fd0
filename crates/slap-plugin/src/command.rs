//! Commands contributed by application plugins.

use std::path::Path;

use clap::ArgMatches;
use slap_project::{Project, Repository};

use crate::{PluginError, PluginRegistry, PluginResult};

/// Everything a command can access while it runs.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    /// The loaded repository.
    pub repository: &'a Repository,
    /// The plugin registry.
    pub plugins: &'a PluginRegistry,
    /// The git repository, if the directory is under version control.
    pub git: Option<&'a slap_git::Repository>,
    /// The directory Slap was invoked from.
    pub cwd: &'a Path,
}

impl<'a> CommandContext<'a> {
    /// Returns the project containing the working directory, or the root
    /// project.
    #[must_use]
    pub fn main_project(&self) -> Option<&'a Project> {
        self.repository.main_project(self.cwd)
    }

    /// Returns the git repository or fails with a helpful message.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is not a git repository.
    pub fn require_git(&self) -> anyhow::Result<&'a slap_git::Repository> {
        self.git
            .ok_or_else(|| anyhow::anyhow!("not inside a git repository"))
    }
}

/// A CLI command.
pub trait Command: Send + Sync {
    /// Returns the subcommand path, e.g. `["changelog", "add"]`.
    fn path(&self) -> &'static [&'static str];

    /// Returns the clap definition of the command's arguments.
    ///
    /// The command name is taken from the last element of [`Command::path`].
    fn definition(&self) -> clap::Command;

    /// Runs the command and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails; the caller reports it and exits
    /// with status 1.
    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> anyhow::Result<i32>;
}

/// Commands registered during plugin activation.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// # Errors
    ///
    /// Returns an error if a command with the same path already exists.
    pub fn register(&mut self, command: impl Command + 'static) -> PluginResult<()> {
        let path = command.path();
        if path.is_empty() {
            return Err(PluginError::ConfigError("empty command path".to_string()));
        }
        if self.get(path).is_some() {
            return Err(PluginError::AlreadyRegistered(format!(
                "command '{}'",
                path.join(" ")
            )));
        }
        self.commands.push(Box::new(command));
        Ok(())
    }

    /// Returns the command with the given path.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.path() == path)
            .map(AsRef::as_ref)
    }

    /// Returns all commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(AsRef::as_ref)
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if no command is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
