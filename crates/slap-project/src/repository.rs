//! Repository discovery and workspace expansion.

use std::path::{Component, Path, PathBuf};

use slap_config::{ConfigError, find_root, load_project_config};
use tracing::{debug, warn};

use crate::{Project, ProjectError, ProjectResult};

/// The directory Slap operates on and the projects it contains.
///
/// Projects are ordered: the root project first, then workspace members in
/// declaration order.
#[derive(Debug, Clone)]
pub struct Repository {
    directory: PathBuf,
    projects: Vec<Project>,
}

impl Repository {
    /// Discovers the repository containing `start_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration is found or a project cannot be
    /// loaded.
    pub fn discover(start_dir: impl AsRef<Path>) -> ProjectResult<Self> {
        let start_dir = start_dir.as_ref().canonicalize()?;
        let root = find_root(&start_dir)?;
        Self::open(root)
    }

    /// Opens the repository rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root has no configuration, a member pattern is
    /// invalid or escapes the root, or a project cannot be loaded.
    pub fn open(root: impl AsRef<Path>) -> ProjectResult<Self> {
        let root = root.as_ref();
        let root = if root.exists() {
            root.canonicalize()?
        } else {
            root.to_path_buf()
        };
        let Some(loaded) = load_project_config(&root)? else {
            return Err(ConfigError::NotFound(root).into());
        };

        let members = loaded
            .config
            .workspace
            .as_ref()
            .map(|w| w.members.clone())
            .unwrap_or_default();

        let mut repository = Self {
            directory: root,
            projects: vec![Project::from_loaded(loaded)],
        };

        for pattern in &members {
            for dir in expand_member(&repository.directory, pattern)? {
                if repository.projects.iter().any(|p| p.directory() == dir) {
                    continue;
                }
                match Project::from_directory(&dir)? {
                    Some(project) => repository.push(project)?,
                    None => warn!(
                        path = %dir.display(),
                        "workspace member has no slap.toml or pyproject.toml, skipping"
                    ),
                }
            }
        }

        debug!(
            root = %repository.directory.display(),
            projects = repository.projects.len(),
            "opened repository"
        );
        Ok(repository)
    }

    /// Creates a repository without projects.
    #[must_use]
    pub fn empty(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            projects: Vec::new(),
        }
    }

    fn push(&mut self, project: Project) -> ProjectResult<()> {
        if self.projects.iter().any(|p| p.id() == project.id()) {
            return Err(ProjectError::DuplicateId(project.id().to_string()));
        }
        self.projects.push(project);
        Ok(())
    }

    /// Returns the repository root directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns all projects, root first.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Returns the root project.
    #[must_use]
    pub fn root_project(&self) -> Option<&Project> {
        self.projects.first()
    }

    /// Returns a project by id.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    /// Returns true if the repository has more than one project.
    #[must_use]
    pub fn is_monorepo(&self) -> bool {
        self.projects.len() > 1
    }

    /// Returns the project whose directory is the deepest ancestor of `dir`.
    #[must_use]
    pub fn project_for(&self, dir: &Path) -> Option<&Project> {
        self.projects
            .iter()
            .filter(|p| dir.starts_with(p.directory()))
            .max_by_key(|p| p.directory().components().count())
    }

    /// Returns the project containing `cwd`, falling back to the root project.
    #[must_use]
    pub fn main_project(&self, cwd: &Path) -> Option<&Project> {
        self.project_for(cwd).or_else(|| self.root_project())
    }
}

/// Expands a workspace member entry into directories.
fn expand_member(root: &Path, pattern: &str) -> ProjectResult<Vec<PathBuf>> {
    let joined = normalize(&root.join(pattern));
    if !joined.starts_with(root) {
        return Err(ProjectError::OutsideRoot(PathBuf::from(pattern)));
    }

    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![joined]);
    }

    let paths = glob::glob(&joined.to_string_lossy()).map_err(|source| {
        ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;

    let mut dirs: Vec<PathBuf> = paths
        .filter_map(Result::ok)
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}
