//! Git repository wrapper.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{ErrorCode, Repository as Git2Repo, Signature, StatusOptions};
use tracing::debug;

use crate::{GitError, GitResult};

/// A commit author as configured in Git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// The `user.name` value.
    pub name: Option<String>,
    /// The `user.email` value.
    pub email: Option<String>,
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    /// The remote name (e.g. "origin").
    pub name: String,
    /// The fetch URL.
    pub url: Option<String>,
    /// Whether this is the remote pushes go to by default.
    pub default: bool,
}

/// A Git repository wrapper.
pub struct Repository {
    inner: Git2Repo,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path())
            .finish()
    }
}

impl Repository {
    /// Opens a repository at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a valid Git repository.
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner = Git2Repo::open(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    /// Discovers the repository containing the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner =
            Git2Repo::discover(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    /// Returns the repository root path (the toplevel of the working tree).
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.workdir().unwrap_or_else(|| self.inner.path())
    }

    /// Returns all tags in the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    pub fn tags(&self) -> GitResult<Vec<String>> {
        let tags = self.inner.tag_names(None)?;
        Ok(tags.iter().flatten().map(String::from).collect())
    }

    /// Creates an annotated tag on HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be created, e.g. because it already
    /// exists and `force` is not set.
    pub fn create_tag(&self, name: &str, message: &str, force: bool) -> GitResult<()> {
        let head = self.inner.head()?;
        let commit = head.peel_to_commit()?;
        let sig = self.inner.signature()?;

        self.inner
            .tag(name, commit.as_object(), &sig, message, force)?;
        debug!(%name, "created tag");

        Ok(())
    }

    /// Returns the configured author.
    ///
    /// Returns `None` if neither `user.name` nor `user.email` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the Git configuration cannot be read.
    pub fn author(&self) -> GitResult<Option<Author>> {
        let config = self.inner.config()?.snapshot()?;
        let name = config.get_string("user.name").ok();
        let email = config.get_string("user.email").ok();

        if name.is_none() && email.is_none() {
            return Ok(None);
        }
        Ok(Some(Author { name, email }))
    }

    /// Returns the short name of the checked out branch.
    ///
    /// Returns `None` for a detached HEAD or an unborn branch.
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        let head = self.inner.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(String::from)
    }

    /// Returns true if tracked files have staged or unstaged changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be computed.
    pub fn is_dirty(&self) -> GitResult<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| !entry.status().is_empty() && !entry.status().is_ignored()))
    }

    /// Returns the contents of a file at the given revision.
    ///
    /// Returns `None` if the file does not exist in that revision.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved or the path is
    /// outside of the working tree.
    pub fn file_contents_at(&self, rev: &str, path: &Path) -> GitResult<Option<Vec<u8>>> {
        let relative = self.relative_path(path)?;
        let object = self
            .inner
            .revparse_single(rev)
            .map_err(|_| GitError::RevisionNotFound(rev.to_string()))?;
        let tree = object.peel_to_tree()?;

        let entry = match tree.get_path(&relative) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let blob = entry.to_object(&self.inner)?.peel_to_blob()?;
        Ok(Some(blob.content().to_vec()))
    }

    /// Stages the given files and commits them on HEAD.
    ///
    /// Files that no longer exist are removed from the index. `name` and
    /// `email` override the configured author.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    pub fn commit_files(
        &self,
        paths: &[PathBuf],
        message: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> GitResult<String> {
        let workdir = self.inner.workdir().ok_or(GitError::Bare)?.to_path_buf();
        let mut index = self.inner.index()?;

        for path in paths {
            let relative = self.relative_path(path)?;
            if workdir.join(&relative).exists() {
                index.add_path(&relative)?;
            } else {
                index.remove_path(&relative)?;
            }
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let sig = match (name, email) {
            (None, None) => self.inner.signature()?,
            _ => {
                let author = self.author()?;
                let default_name = author.as_ref().and_then(|a| a.name.clone());
                let default_email = author.as_ref().and_then(|a| a.email.clone());
                Signature::now(
                    name.or(default_name.as_deref()).unwrap_or("slap"),
                    email.or(default_email.as_deref()).unwrap_or(""),
                )?
            }
        };

        let parent = self.inner.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        debug!(%oid, files = paths.len(), "created commit");

        Ok(oid.to_string())
    }

    /// Returns the configured remotes.
    ///
    /// `origin`, or the only remote if there is exactly one, is the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the remotes cannot be read.
    pub fn remotes(&self) -> GitResult<Vec<Remote>> {
        let names = self.inner.remotes()?;
        let names: Vec<String> = names.iter().flatten().map(String::from).collect();
        let single = names.len() == 1;

        names
            .into_iter()
            .map(|name| {
                let remote = self.inner.find_remote(&name)?;
                Ok(Remote {
                    url: remote.url().map(String::from),
                    default: single || name == "origin",
                    name,
                })
            })
            .collect()
    }

    /// Returns the default remote, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the remotes cannot be read.
    pub fn default_remote(&self) -> GitResult<Option<Remote>> {
        Ok(self.remotes()?.into_iter().find(|r| r.default))
    }

    /// Pushes the given refs to a remote.
    ///
    /// This delegates to the `git` executable so that the user's credential
    /// helpers and SSH agent apply.
    ///
    /// # Errors
    ///
    /// Returns an error if `git push` cannot be run or fails.
    pub fn push(&self, remote: &str, refs: &[String]) -> GitResult<()> {
        let mut args = vec!["push".to_string(), remote.to_string()];
        args.extend(refs.iter().cloned());
        debug!(?args, "running git");

        let output = Command::new("git")
            .args(&args)
            .current_dir(self.path())
            .output()?;

        if !output.status.success() {
            return Err(GitError::Command {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Converts a path into one relative to the working tree.
    fn relative_path(&self, path: &Path) -> GitResult<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }

        let workdir = self.inner.workdir().ok_or(GitError::Bare)?;
        if let Ok(relative) = path.strip_prefix(workdir) {
            return Ok(relative.to_path_buf());
        }

        // Resolve symlinks (e.g. /var -> /private/var on macOS) before giving up.
        let canonical_workdir = workdir.canonicalize()?;
        let canonical_path = match path.canonicalize() {
            Ok(p) => p,
            Err(_) => path
                .parent()
                .and_then(|p| p.canonicalize().ok())
                .zip(path.file_name())
                .map(|(parent, name)| parent.join(name))
                .ok_or_else(|| GitError::OutsideWorkTree(path.to_path_buf()))?,
        };
        canonical_path
            .strip_prefix(&canonical_workdir)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideWorkTree(path.to_path_buf()))
    }
}
