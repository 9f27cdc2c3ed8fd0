//! Remote VCS host resolution.

use slap_plugin::{NullVcsHost, PluginRegistry, VcsHost};
use slap_project::Project;
use tracing::{debug, warn};

/// Resolves the VCS host of a project.
///
/// The `[remote]` configuration is tried first, then the URL of the default
/// git remote. Falls back to [`NullVcsHost`].
#[must_use]
pub fn resolve_vcs_host(
    project: Option<&Project>,
    git: Option<&slap_git::Repository>,
    plugins: &PluginRegistry,
) -> Box<dyn VcsHost> {
    if let Some(remote) = project.and_then(|p| p.config().remote.as_ref()) {
        for detector in plugins.vcs_hosts() {
            if let Some(host) = detector.from_config(remote) {
                debug!(detector = detector.name(), "using configured remote");
                return host;
            }
        }
        warn!(kind = %remote.kind, "no plugin handles the configured remote type");
    }

    let url = git
        .and_then(|g| g.default_remote().ok().flatten())
        .and_then(|r| r.url);
    if let Some(url) = url {
        for detector in plugins.vcs_hosts() {
            if let Some(host) = detector.detect(&url) {
                debug!(detector = detector.name(), %url, "detected remote");
                return host;
            }
        }
        debug!(%url, "remote not recognized by any plugin");
    }

    Box::new(NullVcsHost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slap_config::RemoteConfig;
    use slap_plugin::{Plugin, PluginResult, VcsHostDetector};
    use std::fs;
    use tempfile::TempDir;

    struct ExampleHost;

    impl VcsHost for ExampleHost {
        fn name(&self) -> &str {
            "example"
        }
        fn normalize_pr(&self, pr: &str) -> PluginResult<String> {
            Ok(format!("https://example.com/pull/{pr}"))
        }
        fn normalize_issue(&self, issue: &str) -> PluginResult<String> {
            Ok(format!("https://example.com/issues/{issue}"))
        }
        fn pr_shortform(&self, _url: &str) -> Option<String> {
            None
        }
        fn issue_shortform(&self, _url: &str) -> Option<String> {
            None
        }
    }

    struct ExampleDetector;

    impl Plugin for ExampleDetector {
        fn name(&self) -> &'static str {
            "example"
        }
        fn version(&self) -> &'static str {
            "0.1.0"
        }
    }

    impl VcsHostDetector for ExampleDetector {
        fn from_config(&self, remote: &RemoteConfig) -> Option<Box<dyn VcsHost>> {
            (remote.kind == "example").then(|| Box::new(ExampleHost) as Box<dyn VcsHost>)
        }
        fn detect(&self, remote_url: &str) -> Option<Box<dyn VcsHost>> {
            remote_url
                .contains("example.com")
                .then(|| Box::new(ExampleHost) as Box<dyn VcsHost>)
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register_vcs_host(ExampleDetector).unwrap();
        registry
    }

    #[test]
    fn test_from_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("slap.toml"),
            "[remote]\ntype = \"example\"\nrepo = \"o/r\"\n",
        )
        .unwrap();
        let project = Project::from_directory(temp_dir.path()).unwrap().unwrap();

        let host = resolve_vcs_host(Some(&project), None, &registry());
        assert_eq!(host.name(), "example");
    }

    #[test]
    fn test_from_git_remote() {
        let temp_dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp_dir.path()).unwrap();
        repo.remote("origin", "https://example.com/o/r.git").unwrap();
        let git = slap_git::Repository::open(temp_dir.path()).unwrap();

        let host = resolve_vcs_host(None, Some(&git), &registry());
        assert_eq!(host.name(), "example");
    }

    #[test]
    fn test_fallback() {
        let host = resolve_vcs_host(None, None, &registry());
        assert_eq!(host.name(), "none");
    }
}
