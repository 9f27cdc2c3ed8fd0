//! GitHub VCS host.

use std::sync::LazyLock;

use regex::Regex;
use slap_config::RemoteConfig;
use slap_plugin::{Plugin, PluginError, PluginResult, VcsHost, VcsHostDetector};

static REMOTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://(?:[^@/]+@)?github\.com/|git@github\.com:|ssh://git@github\.com/)([^/]+)/([^/]+?)(?:\.git)?/?$",
    )
    .expect("invalid regex")
});

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<owner>[\w.-]+)/(?P<repo>[\w.-]+))?#?(?P<number>\d+)$").expect("invalid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+)/(?:pull|issues)/(?P<number>\d+)/?$")
        .expect("invalid regex")
});

/// A GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubVcsHost {
    owner: String,
    repo: String,
}

impl GithubVcsHost {
    /// Creates a host for `owner/repo`.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo`.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(owner, repo))
    }

    /// Parses an HTTPS or SSH GitHub remote URL.
    #[must_use]
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let caps = REMOTE_URL_RE.captures(url.trim())?;
        Some(Self::new(&caps[1], &caps[2]))
    }

    /// Returns `owner/repo`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn normalize(&self, reference: &str, kind: &str) -> PluginResult<String> {
        let reference = reference.trim();
        if reference.starts_with("https://") || reference.starts_with("http://") {
            return Ok(reference.to_string());
        }

        let caps = REFERENCE_RE
            .captures(reference)
            .ok_or_else(|| PluginError::InvalidReference(reference.to_string()))?;
        let owner = caps.name("owner").map_or(self.owner.as_str(), |m| m.as_str());
        let repo = caps.name("repo").map_or(self.repo.as_str(), |m| m.as_str());
        Ok(format!(
            "https://github.com/{owner}/{repo}/{kind}/{}",
            &caps["number"]
        ))
    }

    fn shortform(&self, url: &str) -> Option<String> {
        let caps = URL_RE.captures(url)?;
        let number = &caps["number"];
        if caps["owner"] == self.owner && caps["repo"] == self.repo {
            Some(format!("#{number}"))
        } else {
            Some(format!("{}/{}#{number}", &caps["owner"], &caps["repo"]))
        }
    }
}

impl VcsHost for GithubVcsHost {
    fn name(&self) -> &str {
        "github"
    }

    fn normalize_pr(&self, pr: &str) -> PluginResult<String> {
        self.normalize(pr, "pull")
    }

    fn normalize_issue(&self, issue: &str) -> PluginResult<String> {
        self.normalize(issue, "issues")
    }

    fn pr_shortform(&self, url: &str) -> Option<String> {
        self.shortform(url)
    }

    fn issue_shortform(&self, url: &str) -> Option<String> {
        self.shortform(url)
    }
}

/// Detects GitHub remotes.
pub struct GithubDetector;

impl GithubDetector {
    /// Creates a new detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GithubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for GithubDetector {
    fn name(&self) -> &'static str {
        "github"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Detects GitHub remotes and normalizes PR and issue references"
    }
}

impl VcsHostDetector for GithubDetector {
    fn from_config(&self, remote: &RemoteConfig) -> Option<Box<dyn VcsHost>> {
        if remote.kind != "github" {
            return None;
        }
        GithubVcsHost::from_slug(&remote.repo).map(|h| Box::new(h) as Box<dyn VcsHost>)
    }

    fn detect(&self, remote_url: &str) -> Option<Box<dyn VcsHost>> {
        GithubVcsHost::from_remote_url(remote_url).map(|h| Box::new(h) as Box<dyn VcsHost>)
    }
}
