//! Release context passed to release plugins.

use semver::Version;
use slap_project::Project;

/// The release being created, as seen by a release plugin.
///
/// Release plugins are called once per project.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseContext<'a> {
    /// The project being released.
    pub project: &'a Project,

    /// The version before the release, if it could be determined.
    pub current_version: Option<&'a Version>,

    /// The version being released.
    pub target_version: &'a Version,

    /// Whether this is a dry run (no actual changes).
    pub dry_run: bool,
}

impl<'a> ReleaseContext<'a> {
    /// Creates a new release context.
    #[must_use]
    pub fn new(project: &'a Project, target_version: &'a Version) -> Self {
        Self {
            project,
            current_version: None,
            target_version,
            dry_run: false,
        }
    }

    /// Sets the current version.
    #[must_use]
    pub fn current_version(mut self, version: Option<&'a Version>) -> Self {
        self.current_version = version;
        self
    }

    /// Sets the dry run flag.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
