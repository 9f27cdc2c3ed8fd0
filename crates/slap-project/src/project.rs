//! A single project.

use std::path::{Path, PathBuf};

use slap_config::{LoadedConfig, ProjectConfig, load_project_config};

use crate::ProjectResult;

/// A project directory with its Slap configuration.
#[derive(Debug, Clone)]
pub struct Project {
    id: String,
    directory: PathBuf,
    loaded: LoadedConfig,
}

impl Project {
    /// Creates a project from a loaded configuration.
    #[must_use]
    pub fn from_loaded(loaded: LoadedConfig) -> Self {
        let directory = loaded.directory().to_path_buf();
        let id = resolve_id(&loaded, &directory);
        Self {
            id,
            directory,
            loaded,
        }
    }

    /// Loads the project in a directory.
    ///
    /// Returns `None` if the directory has no configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> ProjectResult<Option<Self>> {
        Ok(load_project_config(dir)?.map(Self::from_loaded))
    }

    /// Returns the project id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the project directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the Slap configuration.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.loaded.config
    }

    /// Returns the path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.loaded.path
    }

    /// Returns the full TOML document of the configuration file.
    #[must_use]
    pub fn document(&self) -> &toml::Table {
        &self.loaded.document
    }

    /// Returns the distribution name declared in `pyproject.toml`, if any.
    #[must_use]
    pub fn dist_name(&self) -> Option<&str> {
        dist_name(&self.loaded.document)
    }
}

fn dist_name(document: &toml::Table) -> Option<&str> {
    document
        .get("project")
        .and_then(|p| p.get("name"))
        .or_else(|| {
            document
                .get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("name"))
        })
        .and_then(toml::Value::as_str)
}

fn resolve_id(loaded: &LoadedConfig, directory: &Path) -> String {
    if let Some(name) = &loaded.config.name {
        return name.clone();
    }
    if let Some(name) = dist_name(&loaded.document) {
        return name.to_string();
    }
    directory
        .file_name()
        .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_id_from_config_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pyproject.toml"),
            "[project]\nname = \"dist\"\n\n[tool.slap]\nname = \"custom\"\n",
        )
        .unwrap();

        let project = Project::from_directory(temp_dir.path()).unwrap().unwrap();
        assert_eq!(project.id(), "custom");
        assert_eq!(project.dist_name(), Some("dist"));
    }

    #[test]
    fn test_id_from_pyproject() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pyproject.toml"),
            "[project]\nname = \"my-package\"\n",
        )
        .unwrap();

        let project = Project::from_directory(temp_dir.path()).unwrap().unwrap();
        assert_eq!(project.id(), "my-package");
    }

    #[test]
    fn test_id_from_poetry() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pyproject.toml"),
            "[tool.poetry]\nname = \"poetry-package\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let project = Project::from_directory(temp_dir.path()).unwrap().unwrap();
        assert_eq!(project.id(), "poetry-package");
    }

    #[test]
    fn test_id_from_directory_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("fallback");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("slap.toml"), "").unwrap();

        let project = Project::from_directory(&dir).unwrap().unwrap();
        assert_eq!(project.id(), "fallback");
        assert_eq!(project.directory(), dir);
        assert_eq!(project.config_path(), dir.join("slap.toml"));
    }

    #[test]
    fn test_from_directory_without_config() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Project::from_directory(temp_dir.path()).unwrap().is_none());
    }
}
