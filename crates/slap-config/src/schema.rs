//! Configuration schema.
//!
//! The same schema is read from the root of `slap.toml` and from the
//! `[tool.slap]` table of `pyproject.toml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Changelog entry types accepted when none are configured.
pub const DEFAULT_CHANGELOG_TYPES: &[&str] = &[
    "breaking change",
    "deprecation",
    "docs",
    "feature",
    "fix",
    "hygiene",
    "improvement",
    "refactor",
    "tests",
];

/// Configuration of a single project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Overrides the project id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declares this project as the root of a monorepo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceConfig>,

    /// Explicit remote VCS host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    /// Test name to shell command.
    #[serde(default)]
    pub test: BTreeMap<String, String>,

    /// Changelog configuration.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Release configuration.
    #[serde(default)]
    pub release: ReleaseConfig,

    /// Check configuration.
    #[serde(default)]
    pub check: CheckConfig,

    /// Plugin selection.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Keys not known to Slap itself, left for third-party plugins.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// Monorepo configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Member project directories, relative to the root. Globs are allowed.
    #[serde(default)]
    pub members: Vec<String>,
}

/// Remote VCS host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Host type (e.g. "github").
    #[serde(rename = "type")]
    pub kind: String,

    /// Repository identifier on the host (e.g. "owner/name").
    pub repo: String,
}

/// Changelog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangelogConfig {
    /// Disabled changelogs are read-only. Useful for a monorepo root whose
    /// members keep their own changelogs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Changelog directory, relative to the project.
    #[serde(default = "default_changelog_directory")]
    pub directory: PathBuf,

    /// Accepted entry types. `None` accepts any type.
    #[serde(default = "default_valid_types")]
    pub valid_types: Option<Vec<String>>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_changelog_directory(),
            valid_types: default_valid_types(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_changelog_directory() -> PathBuf {
    PathBuf::from(".changelog")
}

#[allow(clippy::unnecessary_wraps)]
fn default_valid_types() -> Option<Vec<String>> {
    Some(
        DEFAULT_CHANGELOG_TYPES
            .iter()
            .map(ToString::to_string)
            .collect(),
    )
}

/// Release configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseConfig {
    /// Branch that tagged releases must be created from.
    #[serde(default = "default_release_branch")]
    pub branch: String,

    /// Tag name; `{version}` is replaced with the new version.
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Commit message; `{version}` is replaced with the new version.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Additional version references.
    #[serde(default)]
    pub references: Vec<VersionReferenceConfig>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            branch: default_release_branch(),
            tag_format: default_tag_format(),
            commit_message: default_commit_message(),
            references: Vec::new(),
        }
    }
}

impl ReleaseConfig {
    /// Renders the tag name for a version.
    #[must_use]
    pub fn tag_name(&self, version: &str) -> String {
        self.tag_format.replace("{version}", version)
    }

    /// Renders the release commit message for a version.
    #[must_use]
    pub fn commit_message(&self, version: &str) -> String {
        self.commit_message.replace("{version}", version)
    }
}

fn default_release_branch() -> String {
    "develop".to_string()
}

fn default_tag_format() -> String {
    "{version}".to_string()
}

fn default_commit_message() -> String {
    "release {version}".to_string()
}

/// A file and regex pattern locating a version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReferenceConfig {
    /// File path, relative to the project.
    pub file: PathBuf,

    /// Regex pattern; the literal `{version}` marks the version.
    pub pattern: String,
}

/// Check configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckConfig {
    /// Fail on warnings.
    #[serde(default)]
    pub warnings_as_errors: bool,

    /// Checks to skip, as `plugin` or `plugin:check`.
    #[serde(default)]
    pub disable: Vec<String>,
}

impl CheckConfig {
    /// Returns true if the given check is disabled.
    #[must_use]
    pub fn is_disabled(&self, plugin: &str, check: &str) -> bool {
        self.disable.iter().any(|entry| match entry.split_once(':') {
            Some((p, c)) => p == plugin && c == check,
            None => entry == plugin,
        })
    }
}

/// Plugin selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Names of plugins that are not loaded.
    #[serde(default)]
    pub disable: Vec<String>,
}
