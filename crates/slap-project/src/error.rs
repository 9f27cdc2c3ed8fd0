//! Project error types.

use std::path::PathBuf;

use slap_config::ConfigError;
use thiserror::Error;

/// Project discovery errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A workspace member pattern is not a valid glob.
    #[error("invalid workspace member pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A workspace member points outside of the repository root.
    #[error("workspace member is outside of the repository: {0}")]
    OutsideRoot(PathBuf),

    /// Two projects resolved to the same id.
    #[error("duplicate project id: {0}")]
    DuplicateId(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_root_display() {
        let err = ProjectError::OutsideRoot(PathBuf::from("../other"));
        assert_eq!(
            err.to_string(),
            "workspace member is outside of the repository: ../other"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = ProjectError::from(ConfigError::NotFound(PathBuf::from("/work")));
        assert_eq!(
            err.to_string(),
            "no slap.toml or pyproject.toml found in /work or its parents"
        );
    }
}
