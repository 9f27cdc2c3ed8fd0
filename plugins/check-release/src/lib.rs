//! Release readiness checks.

use std::collections::BTreeSet;

use slap_plugin::{Check, CheckPlugin, Plugin, PluginResult, ReleasePlugin};
use slap_project::Project;
use slap_release_version_refs::VersionRefsPlugin;

/// Check plugin verifying that version references agree.
pub struct ReleaseChecks {
    refs: VersionRefsPlugin,
}

impl ReleaseChecks {
    /// Creates a new plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            refs: VersionRefsPlugin::new(),
        }
    }
}

impl Default for ReleaseChecks {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ReleaseChecks {
    fn name(&self) -> &'static str {
        "release"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Checks that all version references agree"
    }
}

impl CheckPlugin for ReleaseChecks {
    fn get_checks(&self, project: &Project) -> PluginResult<Vec<Check>> {
        let refs = self.refs.get_version_refs(project)?;
        let values: BTreeSet<&str> = refs.iter().map(|r| r.value.as_str()).collect();

        let check = match values.len() {
            0 => Check::warning("consistent-versions", "no version references found"),
            1 => Check::ok(
                "consistent-versions",
                format!(
                    "version {} ({} reference(s))",
                    values.iter().next().copied().unwrap_or_default(),
                    refs.len()
                ),
            ),
            _ => {
                let details = refs
                    .iter()
                    .map(|r| {
                        let file = r.file.strip_prefix(project.directory()).unwrap_or(&r.file);
                        format!("{}: {}", file.display(), r.value)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Check::error(
                    "consistent-versions",
                    format!("found {} different versions", values.len()),
                )
                .with_details(details)
            }
        };
        Ok(vec![check])
    }
}
