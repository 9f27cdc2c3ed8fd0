//! Git error types.

use thiserror::Error;

/// Git-related errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(std::path::PathBuf),

    /// Revision could not be resolved.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// Path is outside of the working tree.
    #[error("path is outside of the repository: {0}")]
    OutsideWorkTree(std::path::PathBuf),

    /// Repository has no working tree.
    #[error("repository is bare")]
    Bare,

    /// The `git` executable failed.
    #[error("`git {command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    /// Git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;
