//! Changelog directory management.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use semver::Version;
use slap_plugin::VcsHost;
use tracing::{debug, warn};

use crate::{Changelog, ChangelogEntry, ChangelogError, ChangelogResult};

/// File name of the changelog collecting unreleased entries.
pub const UNRELEASED_FILE: &str = "_unreleased.toml";

/// A changelog file on disk.
#[derive(Debug, Clone)]
pub struct ManagedChangelog {
    /// Path of the file.
    pub path: PathBuf,
    /// The released version, `None` for the unreleased changelog.
    pub version: Option<Version>,
    /// The parsed content; empty if the file does not exist.
    pub content: Changelog,
    exists: bool,
}

impl ManagedChangelog {
    /// Creates an in-memory changelog that has not been saved yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, version: Option<Version>, content: Changelog) -> Self {
        Self {
            path: path.into(),
            version,
            content,
            exists: false,
        }
    }

    fn load(path: PathBuf, version: Option<Version>) -> ChangelogResult<Self> {
        if !path.is_file() {
            return Ok(Self {
                path,
                version,
                content: Changelog::default(),
                exists: false,
            });
        }

        let raw = fs::read_to_string(&path)?;
        let content = Changelog::from_toml(&raw).map_err(|source| ChangelogError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            version,
            content,
            exists: true,
        })
    }

    /// Returns true if the file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the version label, "Unreleased" for unreleased changes.
    #[must_use]
    pub fn label(&self) -> String {
        self.version
            .as_ref()
            .map_or_else(|| "Unreleased".to_string(), ToString::to_string)
    }

    /// Writes the changelog to disk, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> ChangelogResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.content.to_toml()?)?;
        self.exists = true;
        debug!(path = %self.path.display(), "saved changelog");
        Ok(())
    }
}

/// Manages the changelog directory of a project.
pub struct ChangelogManager {
    directory: PathBuf,
    vcs_host: Box<dyn VcsHost>,
    valid_types: Option<Vec<String>>,
    readonly: bool,
}

impl ChangelogManager {
    /// Creates a manager for a changelog directory.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, vcs_host: Box<dyn VcsHost>) -> Self {
        Self {
            directory: directory.into(),
            vcs_host,
            valid_types: None,
            readonly: false,
        }
    }

    /// Restricts entry types. `None` accepts any type.
    #[must_use]
    pub fn with_valid_types(mut self, valid_types: Option<Vec<String>>) -> Self {
        self.valid_types = valid_types;
        self
    }

    /// Marks the changelog as read-only.
    #[must_use]
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Returns the changelog directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the VCS host used for references.
    #[must_use]
    pub fn vcs_host(&self) -> &dyn VcsHost {
        self.vcs_host.as_ref()
    }

    /// Returns true if the changelog may not be modified.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Returns the unreleased changelog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn unreleased(&self) -> ChangelogResult<ManagedChangelog> {
        ManagedChangelog::load(self.directory.join(UNRELEASED_FILE), None)
    }

    /// Returns the changelog of a released version.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn version(&self, version: &Version) -> ChangelogResult<ManagedChangelog> {
        ManagedChangelog::load(
            self.directory.join(format!("{version}.toml")),
            Some(version.clone()),
        )
    }

    /// Returns every existing changelog: unreleased first, then released
    /// versions, newest first.
    ///
    /// Files whose names are not valid versions are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a file cannot be
    /// parsed.
    pub fn all(&self) -> ChangelogResult<Vec<ManagedChangelog>> {
        let mut result = Vec::new();

        let unreleased = self.unreleased()?;
        if unreleased.exists() {
            result.push(unreleased);
        }

        if !self.directory.is_dir() {
            return Ok(result);
        }

        let mut versions = Vec::new();
        for dir_entry in fs::read_dir(&self.directory)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.file_name().and_then(|n| n.to_str()) == Some(UNRELEASED_FILE) {
                continue;
            }
            match Version::parse(stem) {
                Ok(version) => versions.push(version),
                Err(_) => warn!(
                    path = %path.display(),
                    "skipping changelog with invalid version name"
                ),
            }
        }

        versions.sort_unstable_by(|a, b| b.cmp(a));
        for version in &versions {
            result.push(self.version(version)?);
        }
        Ok(result)
    }

    /// Creates a new entry with a random id.
    ///
    /// The type is validated and the PR and issues are normalized through
    /// the VCS host.
    ///
    /// # Errors
    ///
    /// Returns an error if the changelog is read-only, the type is invalid,
    /// or a reference cannot be normalized.
    pub fn make_entry(
        &self,
        kind: &str,
        description: &str,
        author: &str,
        pr: Option<&str>,
        issues: &[String],
    ) -> ChangelogResult<ChangelogEntry> {
        if self.readonly {
            return Err(ChangelogError::ReadOnly(self.directory.clone()));
        }
        self.check_type(kind)?;

        let pr = pr.map(|p| self.vcs_host.normalize_pr(p)).transpose()?;
        let issues = issues
            .iter()
            .map(|i| self.vcs_host.normalize_issue(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChangelogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            author: author.to_string(),
            pr,
            issues,
        })
    }

    fn check_type(&self, kind: &str) -> ChangelogResult<()> {
        match &self.valid_types {
            Some(valid) if !valid.iter().any(|t| t == kind) => Err(ChangelogError::InvalidType {
                kind: kind.to_string(),
                valid: valid.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Moves the unreleased changelog into the file of `version`.
    ///
    /// Returns `None` if there is no unreleased changelog. With `dry_run`
    /// the released changelog is returned without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the changelog is read-only, the version file
    /// already exists, or a file cannot be read or written.
    pub fn release(
        &self,
        version: &Version,
        date: NaiveDate,
        dry_run: bool,
    ) -> ChangelogResult<Option<ManagedChangelog>> {
        if self.readonly {
            return Err(ChangelogError::ReadOnly(self.directory.clone()));
        }

        let unreleased = self.unreleased()?;
        if !unreleased.exists() {
            return Ok(None);
        }

        let mut released = self.version(version)?;
        if released.exists() {
            return Err(ChangelogError::AlreadyReleased(version.clone()));
        }

        released.content = unreleased.content;
        released.content.release_date = Some(date);

        if !dry_run {
            released.save()?;
            fs::remove_file(&unreleased.path)?;
        }
        debug!(%version, dry_run, "released changelog");
        Ok(Some(released))
    }

    /// Validates a changelog, returning one message per problem.
    #[must_use]
    pub fn validate(&self, changelog: &Changelog) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for entry in &changelog.entries {
            if self.check_type(&entry.kind).is_err() {
                problems.push(format!("entry {}: invalid type '{}'", entry.id, entry.kind));
            }
            if entry.authors().is_empty() {
                problems.push(format!("entry {}: no author", entry.id));
            }
            if !seen.insert(entry.id.as_str()) {
                problems.push(format!("entry {}: duplicate id", entry.id));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slap_plugin::NullVcsHost;
    use tempfile::TempDir;

    fn manager(dir: &Path) -> ChangelogManager {
        ChangelogManager::new(dir.join(".changelog"), Box::new(NullVcsHost)).with_valid_types(
            Some(vec!["feature".to_string(), "fix".to_string()]),
        )
    }

    fn add_entry(manager: &ChangelogManager, kind: &str) -> ChangelogEntry {
        let entry = manager
            .make_entry(kind, "Something", "alice", None, &[])
            .unwrap();
        let mut unreleased = manager.unreleased().unwrap();
        unreleased.content.entries.push(entry.clone());
        unreleased.save().unwrap();
        entry
    }

    #[test]
    fn test_unreleased_missing() {
        let temp_dir = TempDir::new().unwrap();
        let unreleased = manager(temp_dir.path()).unreleased().unwrap();
        assert!(!unreleased.exists());
        assert!(unreleased.version.is_none());
        assert_eq!(unreleased.label(), "Unreleased");
        assert!(unreleased.content.entries.is_empty());
    }

    #[test]
    fn test_make_entry() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let entry = manager
            .make_entry(
                "feature",
                "Add things",
                "alice",
                Some("https://example.com/pull/3"),
                &["https://example.com/issues/1".to_string()],
            )
            .unwrap();

        assert_eq!(entry.kind, "feature");
        assert_eq!(entry.pr.as_deref(), Some("https://example.com/pull/3"));
        assert_eq!(entry.issues.len(), 1);
        assert!(uuid::Uuid::parse_str(&entry.id).is_ok());
    }

    #[test]
    fn test_make_entry_ids_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let a = manager.make_entry("fix", "a", "x", None, &[]).unwrap();
        let b = manager.make_entry("fix", "b", "x", None, &[]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_make_entry_invalid_type() {
        let temp_dir = TempDir::new().unwrap();
        let result = manager(temp_dir.path()).make_entry("feat", "x", "alice", None, &[]);
        assert!(matches!(result, Err(ChangelogError::InvalidType { .. })));
    }

    #[test]
    fn test_make_entry_any_type_without_restriction() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ChangelogManager::new(temp_dir.path(), Box::new(NullVcsHost));
        assert!(manager.make_entry("whatever", "x", "a", None, &[]).is_ok());
    }

    #[test]
    fn test_make_entry_unnormalizable_pr() {
        let temp_dir = TempDir::new().unwrap();
        let result = manager(temp_dir.path()).make_entry("fix", "x", "alice", Some("#3"), &[]);
        assert!(matches!(result, Err(ChangelogError::Reference(_))));
    }

    #[test]
    fn test_readonly() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path()).readonly(true);
        assert!(matches!(
            manager.make_entry("fix", "x", "alice", None, &[]),
            Err(ChangelogError::ReadOnly(_))
        ));
        assert!(matches!(
            manager.release(
                &Version::new(1, 0, 0),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                false
            ),
            Err(ChangelogError::ReadOnly(_))
        ));
    }

    #[test]
    fn test_release() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let entry = add_entry(&manager, "fix");
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();

        let released = manager
            .release(&Version::new(1, 0, 0), date, false)
            .unwrap()
            .unwrap();
        assert!(released.exists());
        assert_eq!(released.content.release_date, Some(date));
        assert_eq!(released.content.entries, vec![entry]);
        assert!(!manager.unreleased().unwrap().exists());

        let reloaded = manager.version(&Version::new(1, 0, 0)).unwrap();
        assert_eq!(reloaded.content, released.content);
    }

    #[test]
    fn test_release_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        add_entry(&manager, "fix");
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();

        let released = manager
            .release(&Version::new(1, 0, 0), date, true)
            .unwrap()
            .unwrap();
        assert!(!released.exists());
        assert!(manager.unreleased().unwrap().exists());
    }

    #[test]
    fn test_release_without_unreleased() {
        let temp_dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let released = manager(temp_dir.path())
            .release(&Version::new(1, 0, 0), date, false)
            .unwrap();
        assert!(released.is_none());
    }

    #[test]
    fn test_release_existing_version() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();

        add_entry(&manager, "fix");
        manager.release(&Version::new(1, 0, 0), date, false).unwrap();
        add_entry(&manager, "feature");

        let result = manager.release(&Version::new(1, 0, 0), date, false);
        assert!(matches!(result, Err(ChangelogError::AlreadyReleased(_))));
    }

    #[test]
    fn test_all_ordering() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();

        for version in ["0.9.0", "1.10.0", "1.2.0"] {
            add_entry(&manager, "fix");
            manager
                .release(&Version::parse(version).unwrap(), date, false)
                .unwrap();
        }
        add_entry(&manager, "feature");
        fs::write(manager.directory().join("notes.toml"), "[changelog]\n").unwrap();

        let labels: Vec<String> = manager
            .all()
            .unwrap()
            .iter()
            .map(ManagedChangelog::label)
            .collect();
        assert_eq!(labels, vec!["Unreleased", "1.10.0", "1.2.0", "0.9.0"]);
    }

    #[test]
    fn test_all_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(manager(temp_dir.path()).all().unwrap().is_empty());
    }

    #[test]
    fn test_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        fs::create_dir_all(manager.directory()).unwrap();
        fs::write(manager.directory().join(UNRELEASED_FILE), "not toml [[").unwrap();

        assert!(matches!(
            manager.unreleased(),
            Err(ChangelogError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let good = manager.make_entry("fix", "ok", "alice", None, &[]).unwrap();
        let mut bad_type = good.clone();
        bad_type.kind = "feat".to_string();
        let mut no_author = manager.make_entry("fix", "ok", "", None, &[]).unwrap();
        no_author.author = String::new();

        let changelog = Changelog {
            release_date: None,
            entries: vec![good.clone(), bad_type, no_author.clone()],
        };
        let problems = manager.validate(&changelog);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("invalid type 'feat'"));
        assert!(problems[1].contains("duplicate id"));
        assert_eq!(problems[2], format!("entry {}: no author", no_author.id));

        let clean = Changelog {
            release_date: None,
            entries: vec![good],
        };
        assert!(manager.validate(&clean).is_empty());
    }
}
