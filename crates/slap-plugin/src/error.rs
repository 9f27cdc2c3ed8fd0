//! Plugin error types.

use thiserror::Error;

/// Plugin-related errors.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Plugin not found.
    #[error("plugin not found: {0}")]
    NotFound(String),

    /// A plugin or command with the same name is already registered.
    #[error("already registered: {0}")]
    AlreadyRegistered(String),

    /// Plugin execution failed.
    #[error("plugin execution failed: {0}")]
    ExecutionFailed(String),

    /// Configuration error.
    #[error("plugin configuration error: {0}")]
    ConfigError(String),

    /// A PR or issue reference could not be understood.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Git error.
    #[error(transparent)]
    Git(#[from] slap_git::GitError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
