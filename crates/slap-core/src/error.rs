//! Core error types.

use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Git error.
    #[error("git error: {0}")]
    Git(#[from] slap_git::GitError),

    /// Plugin error.
    #[error("plugin error: {0}")]
    Plugin(#[from] slap_plugin::PluginError),

    /// Project error.
    #[error(transparent)]
    Project(#[from] slap_project::ProjectError),

    /// Changelog error.
    #[error(transparent)]
    Changelog(#[from] slap_changelog::ChangelogError),

    /// Version parsing error.
    #[error("version error: {0}")]
    Version(#[from] semver::Error),

    /// The release target is neither a bump rule nor a version.
    #[error("invalid version or bump rule: {0}")]
    InvalidTarget(String),

    /// A bump rule was given but the current version is unknown.
    #[error("cannot apply bump rule '{0}' without a current version")]
    NoCurrentVersion(String),

    /// The target version does not increase the current one.
    #[error("target version {target} is not greater than the current version {current} (use --force)")]
    VersionNotIncreasing { current: Version, target: Version },

    /// Version references disagree.
    #[error("inconsistent versions: {}", .0.join(", "))]
    InconsistentVersions(Vec<String>),

    /// No release plugin found a version reference.
    #[error("no version references found")]
    NoVersionRefs,

    /// A version reference points outside of its file.
    #[error("version reference out of bounds in {0}")]
    RefOutOfBounds(PathBuf),

    /// The release is not started from the release branch.
    #[error("releases must be created from branch '{expected}', current branch is '{actual}'")]
    WrongBranch { expected: String, actual: String },

    /// The worktree has uncommitted changes.
    #[error("the worktree has uncommitted changes")]
    DirtyWorktree,

    /// Git is required but the directory is not a repository.
    #[error("not inside a git repository")]
    NoGit,

    /// No remote to push to.
    #[error("no git remote to push to")]
    NoRemote,

    /// A test selector matched nothing.
    #[error("no test matches '{0}'")]
    UnknownTest(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
