//! Configuration management for Slap.
//!
//! This crate loads project configuration from `slap.toml` or from the
//! `[tool.slap]` table of `pyproject.toml`.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    LoadedConfig, PYPROJECT_TOML, SLAP_TOML, config_file_in, find_root, load_config,
    load_project_config,
};
pub use schema::{
    ChangelogConfig, CheckConfig, DEFAULT_CHANGELOG_TYPES, PluginsConfig, ProjectConfig,
    ReleaseConfig, RemoteConfig, VersionReferenceConfig, WorkspaceConfig,
};
