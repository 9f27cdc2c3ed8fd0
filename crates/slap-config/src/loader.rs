//! Configuration loader.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, ConfigResult, ProjectConfig};

/// Dedicated configuration file name.
pub const SLAP_TOML: &str = "slap.toml";

/// Python project file; Slap reads its `[tool.slap]` table.
pub const PYPROJECT_TOML: &str = "pyproject.toml";

/// A configuration loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The file the configuration was read from.
    pub path: PathBuf,

    /// The parsed Slap configuration.
    pub config: ProjectConfig,

    /// The complete TOML document of the file.
    pub document: toml::Table,
}

impl LoadedConfig {
    /// Returns the directory containing the configuration file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Returns true if the configuration came from `pyproject.toml`.
    #[must_use]
    pub fn is_pyproject(&self) -> bool {
        self.path.file_name().and_then(|n| n.to_str()) == Some(PYPROJECT_TOML)
    }
}

/// Loads configuration from the given file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or is neither a
/// `slap.toml` nor a `pyproject.toml`.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LoadedConfig> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let document: toml::Table =
        toml::from_str(&content).map_err(|source| ConfigError::InvalidToml {
            path: path.to_path_buf(),
            source,
        })?;

    let section = match path.file_name().and_then(|n| n.to_str()) {
        Some(SLAP_TOML) => toml::Value::Table(document.clone()),
        Some(PYPROJECT_TOML) => document
            .get("tool")
            .and_then(|tool| tool.get("slap"))
            .cloned()
            .unwrap_or_else(|| toml::Value::Table(toml::Table::new())),
        _ => {
            return Err(ConfigError::Invalid(format!(
                "unsupported configuration file: {}",
                path.display()
            )));
        }
    };

    let config: ProjectConfig =
        section
            .try_into()
            .map_err(|source| ConfigError::InvalidToml {
                path: path.to_path_buf(),
                source,
            })?;

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
        document,
    })
}

/// Returns the configuration file of a directory, if any.
///
/// `slap.toml` takes precedence over `pyproject.toml`.
#[must_use]
pub fn config_file_in(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();
    [SLAP_TOML, PYPROJECT_TOML]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Loads the configuration of a directory.
///
/// Returns `None` if the directory has no configuration file.
///
/// # Errors
///
/// Returns an error if a configuration file exists but cannot be parsed.
pub fn load_project_config(dir: impl AsRef<Path>) -> ConfigResult<Option<LoadedConfig>> {
    config_file_in(dir).map(load_config).transpose()
}

/// Finds the repository root starting from the given directory.
///
/// Walks up the directory tree. The outermost directory whose configuration
/// declares a `[workspace]` wins; otherwise the nearest directory with a
/// configuration file is returned.
///
/// # Errors
///
/// Returns an error if no configuration file is found or one cannot be parsed.
pub fn find_root(start_dir: impl AsRef<Path>) -> ConfigResult<PathBuf> {
    let start_dir = start_dir.as_ref();
    let mut nearest: Option<PathBuf> = None;
    let mut workspace_root: Option<PathBuf> = None;

    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        if let Some(loaded) = load_project_config(current)? {
            if nearest.is_none() {
                nearest = Some(current.to_path_buf());
            }
            if loaded.config.workspace.is_some() {
                workspace_root = Some(current.to_path_buf());
            }
        }
        dir = current.parent();
    }

    workspace_root
        .or(nearest)
        .ok_or_else(|| ConfigError::NotFound(start_dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_not_found() {
        let result = load_config("/nonexistent/path/slap.toml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_slap_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SLAP_TOML);
        fs::write(
            &path,
            r#"
            name = "demo"

            [test]
            unit = "cargo test"
        "#,
        )
        .unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.config.name.as_deref(), Some("demo"));
        assert_eq!(loaded.config.test["unit"], "cargo test");
        assert!(!loaded.is_pyproject());
        assert_eq!(loaded.directory(), temp_dir.path());
    }

    #[test]
    fn test_load_pyproject_tool_slap() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PYPROJECT_TOML);
        fs::write(
            &path,
            r#"
            [project]
            name = "my-package"
            version = "1.0.0"

            [tool.slap.release]
            branch = "main"
        "#,
        )
        .unwrap();

        let loaded = load_config(&path).unwrap();
        assert!(loaded.is_pyproject());
        assert_eq!(loaded.config.release.branch, "main");
        assert_eq!(
            loaded.document["project"]["name"].as_str(),
            Some("my-package")
        );
    }

    #[test]
    fn test_load_pyproject_without_tool_slap() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PYPROJECT_TOML);
        fs::write(&path, "[project]\nname = \"x\"\n").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.config.release.branch, "develop");
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SLAP_TOML);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::InvalidToml { .. })));
    }

    #[test]
    fn test_load_config_unsupported_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.toml");
        fs::write(&path, "").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_slap_toml_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SLAP_TOML), "name = \"from-slap\"").unwrap();
        fs::write(
            temp_dir.path().join(PYPROJECT_TOML),
            "[tool.slap]\nname = \"from-pyproject\"",
        )
        .unwrap();

        let loaded = load_project_config(temp_dir.path()).unwrap().unwrap();
        assert_eq!(loaded.config.name.as_deref(), Some("from-slap"));
    }

    #[test]
    fn test_load_project_config_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_project_config(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_find_root_nearest() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SLAP_TOML), "").unwrap();
        let child = temp_dir.path().join("src").join("pkg");
        fs::create_dir_all(&child).unwrap();

        let root = find_root(&child).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_root_prefers_workspace() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SLAP_TOML),
            "[workspace]\nmembers = [\"a\"]\n",
        )
        .unwrap();
        let member = temp_dir.path().join("a");
        fs::create_dir(&member).unwrap();
        fs::write(member.join(PYPROJECT_TOML), "[project]\nname = \"a\"\n").unwrap();

        let root = find_root(&member).unwrap();
        assert_eq!(root, temp_dir.path());
    }
}
