//! Release plugin trait.

use std::path::PathBuf;

use slap_project::Project;

use super::Plugin;
use crate::{PluginResult, ReleaseContext};

/// The location of a version string in a file.
///
/// `start` and `end` are byte offsets into the file content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionRef {
    /// The file containing the version.
    pub file: PathBuf,
    /// Byte offset where the version starts.
    pub start: usize,
    /// Byte offset just past the version.
    pub end: usize,
    /// The version string currently in the file.
    pub value: String,
}

impl VersionRef {
    /// Creates a version reference.
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        start: usize,
        end: usize,
        value: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            value: value.into(),
        }
    }
}

/// Takes part in `slap release`.
#[allow(unused_variables)]
pub trait ReleasePlugin: Plugin {
    /// Returns the version references this plugin knows about.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should contain a version cannot be
    /// read or parsed.
    fn get_version_refs(&self, project: &Project) -> PluginResult<Vec<VersionRef>> {
        Ok(Vec::new())
    }

    /// Performs extra work once version references have been updated.
    ///
    /// Returns the files that were changed so they can be committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the release work fails.
    fn create_release(&self, ctx: &ReleaseContext<'_>) -> PluginResult<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ref_ordering() {
        let a = VersionRef::new("a.toml", 10, 15, "1.0.0");
        let b = VersionRef::new("a.toml", 30, 35, "1.0.0");
        let c = VersionRef::new("b.toml", 0, 5, "1.0.0");
        let mut refs = vec![c.clone(), b.clone(), a.clone()];
        refs.sort();
        assert_eq!(refs, vec![a, b, c]);
    }
}
