//! Release orchestration.

use std::collections::BTreeSet;
use std::path::PathBuf;

use semver::Version;
use slap_plugin::{PluginRegistry, ReleaseContext, VersionRef};
use slap_project::Repository;
use tracing::{debug, info};

use crate::{CoreError, CoreResult, VersionManager, apply_version_refs};

/// The version currently declared by the version references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentVersion {
    /// No reference was found.
    Missing,
    /// All references agree.
    Consistent(String),
    /// References disagree; the distinct values in sorted order.
    Inconsistent(Vec<String>),
}

/// What `slap release` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct ReleasePlan {
    /// A bump rule (`major`, `minor`, `patch`) or an explicit version.
    pub target: String,
    /// Commit the changes and create a tag.
    pub tag: bool,
    /// Push the commit and tag.
    pub push: bool,
    /// Remote to push to; the default remote if unset.
    pub remote: Option<String>,
    /// Do not modify anything.
    pub dry_run: bool,
    /// Allow a target that is not greater than the current version.
    pub force: bool,
    /// Require the release branch.
    pub branch_check: bool,
    /// Require a clean worktree.
    pub worktree_check: bool,
}

/// The result of a release.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// Version before the release, if known.
    pub previous: Option<Version>,
    /// The released version.
    pub version: Version,
    /// Files changed by the release.
    pub changed_files: Vec<PathBuf>,
    /// The release commit.
    pub commit: Option<String>,
    /// The tag name, if tagging was requested.
    pub tag: Option<String>,
    /// The remote that was pushed to.
    pub pushed_to: Option<String>,
}

/// Manages the release process.
///
/// Tag, branch and commit settings come from the root project; every project
/// in the repository is released with the same version.
pub struct ReleaseManager<'a> {
    repository: &'a Repository,
    plugins: &'a PluginRegistry,
    git: Option<&'a slap_git::Repository>,
    version_manager: VersionManager,
}

impl<'a> ReleaseManager<'a> {
    /// Creates a new release manager.
    #[must_use]
    pub fn new(
        repository: &'a Repository,
        plugins: &'a PluginRegistry,
        git: Option<&'a slap_git::Repository>,
    ) -> Self {
        Self {
            repository,
            plugins,
            git,
            version_manager: VersionManager::new(),
        }
    }

    /// Collects the version references of every project from every release
    /// plugin, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if a plugin fails.
    pub fn collect(&self) -> CoreResult<Vec<VersionRef>> {
        let mut refs = Vec::new();
        for project in self.repository.projects() {
            for plugin in self.plugins.release_plugins() {
                let found = plugin.get_version_refs(project)?;
                debug!(
                    plugin = plugin.name(),
                    project = project.id(),
                    count = found.len(),
                    "collected version references"
                );
                refs.extend(found);
            }
        }
        refs.sort();
        refs.dedup();
        Ok(refs)
    }

    /// Determines the current version from the references.
    #[must_use]
    pub fn current_version(refs: &[VersionRef]) -> CurrentVersion {
        let distinct: BTreeSet<&str> = refs.iter().map(|r| r.value.as_str()).collect();
        let mut values: Vec<String> = distinct.into_iter().map(String::from).collect();
        match values.len() {
            0 => CurrentVersion::Missing,
            1 => CurrentVersion::Consistent(values.remove(0)),
            _ => CurrentVersion::Inconsistent(values),
        }
    }

    /// Executes a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the versions are inconsistent, the target does not
    /// increase the current version without `force`, a precondition fails,
    /// or any step of the release fails.
    pub fn release(&self, plan: &ReleasePlan) -> CoreResult<ReleaseOutcome> {
        info!(target = %plan.target, dry_run = plan.dry_run, "starting release");

        let refs = self.collect()?;
        let previous = match Self::current_version(&refs) {
            CurrentVersion::Missing => return Err(CoreError::NoVersionRefs),
            CurrentVersion::Consistent(value) => Some(Version::parse(&value)?),
            CurrentVersion::Inconsistent(values) if !plan.force => {
                return Err(CoreError::InconsistentVersions(values));
            }
            CurrentVersion::Inconsistent(_) => None,
        };

        let version = self
            .version_manager
            .resolve_target(previous.as_ref(), &plan.target)?;
        if let Some(current) = &previous
            && &version <= current
            && !plan.force
        {
            return Err(CoreError::VersionNotIncreasing {
                current: current.clone(),
                target: version,
            });
        }
        info!(
            previous = ?previous.as_ref().map(ToString::to_string),
            next = %version,
            "calculated new version"
        );

        let release = self
            .repository
            .root_project()
            .map(|p| p.config().release.clone())
            .unwrap_or_default();

        let git = if plan.tag {
            let git = self.git.ok_or(CoreError::NoGit)?;
            if plan.branch_check {
                let actual = git.current_branch().unwrap_or_default();
                if actual != release.branch {
                    return Err(CoreError::WrongBranch {
                        expected: release.branch.clone(),
                        actual,
                    });
                }
            }
            if plan.worktree_check && git.is_dirty()? {
                return Err(CoreError::DirtyWorktree);
            }
            Some(git)
        } else {
            None
        };

        // Plugins must be able to fail before any file is rewritten.
        if !plan.dry_run {
            self.run_release_plugins(&version, previous.as_ref(), true)?;
        }
        let mut changed_files = apply_version_refs(&refs, &version, plan.dry_run)?;
        let plugin_files = self.run_release_plugins(&version, previous.as_ref(), plan.dry_run)?;
        changed_files.extend(plugin_files);
        changed_files.sort();
        changed_files.dedup();

        let mut outcome = ReleaseOutcome {
            previous,
            version,
            changed_files,
            commit: None,
            tag: None,
            pushed_to: None,
        };

        let Some(git) = git else {
            return Ok(outcome);
        };

        let version_str = outcome.version.to_string();
        let tag_name = release.tag_name(&version_str);
        outcome.tag = Some(tag_name.clone());
        if plan.dry_run {
            return Ok(outcome);
        }

        let commit = git.commit_files(
            &outcome.changed_files,
            &release.commit_message(&version_str),
            None,
            None,
        )?;
        info!(%commit, "created release commit");
        outcome.commit = Some(commit);

        git.create_tag(&tag_name, &tag_name, plan.force)?;
        info!(%tag_name, "created tag");

        if plan.push {
            let remote = match &plan.remote {
                Some(remote) => remote.clone(),
                None => git.default_remote()?.ok_or(CoreError::NoRemote)?.name,
            };
            let mut push_refs = Vec::new();
            if let Some(branch) = git.current_branch() {
                push_refs.push(branch);
            }
            push_refs.push(format!("refs/tags/{tag_name}"));
            git.push(&remote, &push_refs)?;
            info!(%remote, "pushed release");
            outcome.pushed_to = Some(remote);
        }

        Ok(outcome)
    }
}

impl ReleaseManager<'_> {
    fn run_release_plugins(
        &self,
        version: &Version,
        previous: Option<&Version>,
        dry_run: bool,
    ) -> CoreResult<Vec<PathBuf>> {
        let mut changed_files = Vec::new();
        for project in self.repository.projects() {
            let ctx = ReleaseContext::new(project, version)
                .current_version(previous)
                .dry_run(dry_run);
            for plugin in self.plugins.release_plugins() {
                let files = plugin.create_release(&ctx)?;
                debug!(
                    plugin = plugin.name(),
                    project = project.id(),
                    files = files.len(),
                    dry_run,
                    "created release"
                );
                changed_files.extend(files);
            }
        }
        Ok(changed_files)
    }
}
