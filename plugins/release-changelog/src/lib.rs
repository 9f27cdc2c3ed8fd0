//! Changelog release plugin.
//!
//! On release, renames `_unreleased.toml` to `<version>.toml` and stamps it
//! with today's date.

use std::path::PathBuf;

use slap_changelog::ChangelogError;
use slap_core::changelog_manager;
use slap_plugin::{NullVcsHost, Plugin, PluginError, PluginResult, ReleaseContext, ReleasePlugin};
use tracing::{debug, info};

/// Release plugin for structured changelogs.
pub struct ChangelogReleasePlugin;

impl ChangelogReleasePlugin {
    /// Creates a new plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChangelogReleasePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ChangelogReleasePlugin {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Moves unreleased changelog entries into the released version"
    }
}

fn release_failed(err: ChangelogError) -> PluginError {
    PluginError::ExecutionFailed(format!("changelog release failed: {err}"))
}

impl ReleasePlugin for ChangelogReleasePlugin {
    fn create_release(&self, ctx: &ReleaseContext<'_>) -> PluginResult<Vec<PathBuf>> {
        let manager = changelog_manager(ctx.project, Box::new(NullVcsHost));
        if manager.is_readonly() {
            debug!(project = ctx.project.id(), "changelog disabled, skipping");
            return Ok(Vec::new());
        }

        let today = chrono::Local::now().date_naive();
        let released = manager
            .release(ctx.target_version, today, ctx.dry_run)
            .map_err(release_failed)?;

        let Some(released) = released else {
            debug!(project = ctx.project.id(), "no unreleased changelog");
            return Ok(Vec::new());
        };

        info!(
            project = ctx.project.id(),
            path = %released.path.display(),
            "released changelog"
        );
        let unreleased = manager
            .unreleased()
            .map_err(release_failed)?;
        Ok(vec![released.path, unreleased.path])
    }
}
