//! Changelog automation trait.

use std::path::PathBuf;

use super::Plugin;
use crate::PluginResult;

/// CI integration for `slap changelog update-pr --use <name>`.
///
/// Supplies the base revision and PR URL from the CI environment and
/// publishes the updated changelog files back to the PR branch.
pub trait ChangelogAutomation: Plugin {
    /// Returns the revision the PR is based on.
    ///
    /// # Errors
    ///
    /// Returns an error if the CI environment does not describe a PR.
    fn base_ref(&self) -> PluginResult<String>;

    /// Returns the PR URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the CI environment does not describe a PR.
    fn pr(&self) -> PluginResult<String>;

    /// Commits and pushes the given files.
    ///
    /// # Errors
    ///
    /// Returns an error if committing or pushing fails.
    fn publish_changes(&self, git: &slap_git::Repository, files: &[PathBuf]) -> PluginResult<()>;
}
