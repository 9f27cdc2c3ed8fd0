//! Version management.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;
use slap_plugin::VersionRef;
use tracing::debug;

use crate::{CoreError, CoreResult};

/// A named version increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpRule {
    /// Increment the major version.
    Major,
    /// Increment the minor version.
    Minor,
    /// Increment the patch version.
    Patch,
}

impl FromStr for BumpRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            other => Err(CoreError::InvalidTarget(other.to_string())),
        }
    }
}

impl fmt::Display for BumpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// Manages version operations.
pub struct VersionManager;

impl VersionManager {
    /// Creates a new version manager.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Bumps a version according to the rule. The pre-release is cleared.
    #[must_use]
    pub fn bump(&self, version: &Version, rule: BumpRule) -> Version {
        let mut new_version = version.clone();

        match rule {
            BumpRule::Major => {
                new_version.major += 1;
                new_version.minor = 0;
                new_version.patch = 0;
            }
            BumpRule::Minor => {
                new_version.minor += 1;
                new_version.patch = 0;
            }
            BumpRule::Patch => {
                new_version.patch += 1;
            }
        }
        new_version.pre = semver::Prerelease::EMPTY;
        new_version.build = semver::BuildMetadata::EMPTY;

        new_version
    }

    /// Resolves the `VERSION` argument of `slap release`: a bump rule
    /// applied to `current`, or an explicit version.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is neither, or if it is a rule and
    /// there is no current version.
    pub fn resolve_target(&self, current: Option<&Version>, arg: &str) -> CoreResult<Version> {
        if let Ok(rule) = arg.parse::<BumpRule>() {
            let current = current.ok_or_else(|| CoreError::NoCurrentVersion(arg.to_string()))?;
            return Ok(self.bump(current, rule));
        }
        Version::parse(arg).map_err(|_| CoreError::InvalidTarget(arg.to_string()))
    }
}

impl Default for VersionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites every version reference with `version`.
///
/// References in the same file are applied from the end of the file
/// backwards so earlier offsets stay valid. Returns the changed files.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, or a reference
/// does not match the file content.
pub fn apply_version_refs(
    refs: &[VersionRef],
    version: &Version,
    dry_run: bool,
) -> CoreResult<Vec<PathBuf>> {
    let mut by_file: BTreeMap<&PathBuf, Vec<&VersionRef>> = BTreeMap::new();
    for r in refs {
        by_file.entry(&r.file).or_default().push(r);
    }

    let new_value = version.to_string();
    let mut changed = Vec::new();

    for (file, mut file_refs) in by_file {
        let mut content = fs::read_to_string(file)?;
        file_refs.sort_by(|a, b| b.start.cmp(&a.start));
        file_refs.dedup_by_key(|r| r.start);

        for r in file_refs {
            match content.get(r.start..r.end) {
                Some(current) if current == r.value => {
                    content.replace_range(r.start..r.end, &new_value);
                }
                _ => return Err(CoreError::RefOutOfBounds(file.clone())),
            }
        }

        debug!(file = %file.display(), dry_run, "updated version references");
        if !dry_run {
            fs::write(file, content)?;
        }
        changed.push(file.clone());
    }

    Ok(changed)
}
