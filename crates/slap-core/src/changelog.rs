//! Changelog manager construction.

use slap_changelog::ChangelogManager;
use slap_plugin::VcsHost;
use slap_project::Project;

/// Builds the changelog manager of a project from its configuration.
#[must_use]
pub fn changelog_manager(project: &Project, vcs_host: Box<dyn VcsHost>) -> ChangelogManager {
    let config = &project.config().changelog;
    ChangelogManager::new(project.directory().join(&config.directory), vcs_host)
        .with_valid_types(config.valid_types.clone())
        .readonly(!config.enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slap_plugin::NullVcsHost;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_changelog_manager_from_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("slap.toml"),
            "[changelog]\nenabled = false\ndirectory = \"changes\"\n",
        )
        .unwrap();
        let project = Project::from_directory(temp_dir.path()).unwrap().unwrap();

        let manager = changelog_manager(&project, Box::new(NullVcsHost));
        assert_eq!(manager.directory(), temp_dir.path().join("changes"));
        assert!(manager.is_readonly());
    }
}
