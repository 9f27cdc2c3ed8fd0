//! Built-in application plugins and their commands.

use anyhow::{Result, bail};
use slap_plugin::{CommandContext, PluginRegistry, PluginResult};
use slap_project::Project;

pub mod changelog;
pub mod check;
pub mod plugins;
pub mod release;
pub mod test;

/// Registers every built-in plugin.
pub fn builtin_plugins() -> PluginResult<PluginRegistry> {
    let mut registry = PluginRegistry::new();

    registry.register_application(check::CheckCommandPlugin)?;
    registry.register_application(release::ReleaseCommandPlugin)?;
    registry.register_application(test::TestCommandPlugin)?;
    registry.register_application(changelog::ChangelogCommandPlugin)?;
    registry.register_application(plugins::PluginsCommandPlugin)?;

    registry.register_check(slap_check_general::GeneralChecks::new())?;
    registry.register_check(slap_check_release::ReleaseChecks::new())?;
    registry.register_release(slap_release_version_refs::VersionRefsPlugin::new())?;
    registry.register_release(slap_release_changelog::ChangelogReleasePlugin::new())?;
    registry.register_vcs_host(slap_vcs_github::GithubDetector::new())?;
    registry.register_automation(slap_vcs_github::GithubActionsAutomation::new())?;

    Ok(registry)
}

/// Fails unless a configuration was found.
pub(crate) fn require_projects(ctx: &CommandContext<'_>) -> Result<()> {
    if ctx.repository.projects().is_empty() {
        bail!(
            "no slap.toml or pyproject.toml found in {} or its parents",
            ctx.cwd.display()
        );
    }
    Ok(())
}

/// Returns the project of the working directory.
pub(crate) fn main_project<'a>(ctx: &CommandContext<'a>) -> Result<&'a Project> {
    require_projects(ctx)?;
    match ctx.main_project() {
        Some(project) => Ok(project),
        None => bail!("no project found for {}", ctx.cwd.display()),
    }
}
