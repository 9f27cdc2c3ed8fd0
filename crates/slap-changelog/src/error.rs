//! Changelog error types.

use std::path::PathBuf;

use semver::Version;
use slap_plugin::PluginError;
use thiserror::Error;

/// Changelog errors.
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// The entry type is not one of the configured types.
    #[error("invalid changelog type '{kind}', expected one of: {}", valid.join(", "))]
    InvalidType { kind: String, valid: Vec<String> },

    /// The changelog is disabled and cannot be modified.
    #[error("changelog in {0} is read-only")]
    ReadOnly(PathBuf),

    /// A changelog for the version already exists.
    #[error("changelog for version {0} already exists")]
    AlreadyReleased(Version),

    /// A changelog file could not be parsed.
    #[error("failed to parse changelog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A changelog could not be serialized.
    #[error("failed to serialize changelog: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A PR or issue reference could not be normalized.
    #[error(transparent)]
    Reference(#[from] PluginError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for changelog operations.
pub type ChangelogResult<T> = Result<T, ChangelogError>;
