//! GitHub Actions changelog automation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use slap_plugin::{ChangelogAutomation, Plugin, PluginError, PluginResult};
use tracing::info;

static PULL_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^refs/pull/(\d+)/merge$").expect("invalid regex"));

const BOT_NAME: &str = "github-actions";
const BOT_EMAIL: &str = "github-actions@github.com";
const COMMIT_MESSAGE: &str = "update changelog PR references";

/// Reads PR information from a `pull_request` GitHub Actions run.
///
/// Uses `GITHUB_BASE_REF`, `GITHUB_HEAD_REF`, `GITHUB_REF`,
/// `GITHUB_REPOSITORY` and `GITHUB_SERVER_URL`.
pub struct GithubActionsAutomation {
    overrides: Option<HashMap<String, String>>,
}

impl GithubActionsAutomation {
    /// Creates an automation reading the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self { overrides: None }
    }

    /// Creates an automation reading the given variables instead of the
    /// process environment.
    #[must_use]
    pub fn with_env(vars: HashMap<String, String>) -> Self {
        Self {
            overrides: Some(vars),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    fn require(&self, name: &str) -> PluginResult<String> {
        self.var(name).ok_or_else(|| {
            PluginError::ExecutionFailed(format!(
                "{name} is not set, is this a GitHub Actions pull_request run?"
            ))
        })
    }
}

impl Default for GithubActionsAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for GithubActionsAutomation {
    fn name(&self) -> &'static str {
        "github-actions"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Updates changelog PR references from GitHub Actions"
    }
}

impl ChangelogAutomation for GithubActionsAutomation {
    fn base_ref(&self) -> PluginResult<String> {
        Ok(format!("origin/{}", self.require("GITHUB_BASE_REF")?))
    }

    fn pr(&self) -> PluginResult<String> {
        let git_ref = self.require("GITHUB_REF")?;
        let number = PULL_REF_RE
            .captures(&git_ref)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                PluginError::ExecutionFailed(format!("GITHUB_REF is not a pull request: {git_ref}"))
            })?;
        let repository = self.require("GITHUB_REPOSITORY")?;
        let server = self
            .var("GITHUB_SERVER_URL")
            .unwrap_or_else(|| "https://github.com".to_string());

        Ok(format!(
            "{}/{repository}/pull/{number}",
            server.trim_end_matches('/')
        ))
    }

    fn publish_changes(&self, git: &slap_git::Repository, files: &[PathBuf]) -> PluginResult<()> {
        let head_ref = self.require("GITHUB_HEAD_REF")?;
        let commit = git.commit_files(files, COMMIT_MESSAGE, Some(BOT_NAME), Some(BOT_EMAIL))?;
        info!(%commit, branch = %head_ref, "pushing changelog updates");
        git.push("origin", &[format!("HEAD:refs/heads/{head_ref}")])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automation(vars: &[(&str, &str)]) -> GithubActionsAutomation {
        GithubActionsAutomation::with_env(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_base_ref() {
        let automation = automation(&[("GITHUB_BASE_REF", "develop")]);
        assert_eq!(automation.base_ref().unwrap(), "origin/develop");
    }

    #[test]
    fn test_base_ref_missing() {
        let err = automation(&[]).base_ref().unwrap_err();
        assert!(err.to_string().contains("GITHUB_BASE_REF is not set"));
    }

    #[test]
    fn test_pr() {
        let automation = automation(&[
            ("GITHUB_REF", "refs/pull/42/merge"),
            ("GITHUB_REPOSITORY", "owner/repo"),
        ]);
        assert_eq!(
            automation.pr().unwrap(),
            "https://github.com/owner/repo/pull/42"
        );
    }

    #[test]
    fn test_pr_custom_server() {
        let automation = automation(&[
            ("GITHUB_REF", "refs/pull/7/merge"),
            ("GITHUB_REPOSITORY", "owner/repo"),
            ("GITHUB_SERVER_URL", "https://github.example.com/"),
        ]);
        assert_eq!(
            automation.pr().unwrap(),
            "https://github.example.com/owner/repo/pull/7"
        );
    }

    #[test]
    fn test_pr_not_a_pull_request() {
        let automation = automation(&[
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_REPOSITORY", "owner/repo"),
        ]);
        assert!(automation.pr().is_err());
    }

    #[test]
    fn test_publish_requires_head_ref() {
        let dir = tempfile::TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let git = slap_git::Repository::open(dir.path()).unwrap();

        let result = automation(&[]).publish_changes(&git, &[]);
        assert!(matches!(result, Err(PluginError::ExecutionFailed(_))));
    }
}
