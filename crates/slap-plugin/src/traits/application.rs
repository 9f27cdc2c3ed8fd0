//! Application plugin trait.

use slap_project::Repository;

use super::Plugin;
use crate::{CommandRegistry, PluginResult};

/// The main extension point: contributes commands to the CLI.
///
/// Every registered application plugin is activated once at startup, after
/// the repository has been loaded.
pub trait ApplicationPlugin: Plugin {
    /// Reads the configuration the plugin needs and registers its commands.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin configuration is invalid or a command
    /// path is already taken.
    fn activate(&self, repository: &Repository, commands: &mut CommandRegistry)
    -> PluginResult<()>;
}
