//! Check execution.

use slap_plugin::{Check, CheckResult, PluginRegistry};
use slap_project::Repository;
use tracing::{debug, warn};

/// A check result attributed to a project and plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Project id.
    pub project: String,
    /// Plugin name.
    pub plugin: String,
    /// The check.
    pub check: Check,
}

impl CheckOutcome {
    /// Returns `plugin:check`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}", self.plugin, self.check.name)
    }
}

/// The results of a check run.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Outcomes sorted by project, plugin and check name.
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    /// Returns the number of checks with the given result.
    #[must_use]
    pub fn count(&self, result: CheckResult) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.check.result == result)
            .count()
    }

    /// Returns the process exit code for this report.
    #[must_use]
    pub fn exit_code(&self, warnings_as_errors: bool) -> i32 {
        let failed = self.outcomes.iter().any(|o| match o.check.result {
            CheckResult::Error => true,
            CheckResult::Warning => warnings_as_errors,
            CheckResult::Ok | CheckResult::Skipped => false,
        });
        i32::from(failed)
    }
}

/// Runs every check plugin on every project.
pub struct CheckRunner<'a> {
    plugins: &'a PluginRegistry,
}

impl<'a> CheckRunner<'a> {
    /// Creates a runner over the registered check plugins.
    #[must_use]
    pub fn new(plugins: &'a PluginRegistry) -> Self {
        Self { plugins }
    }

    /// Runs the checks.
    ///
    /// Checks disabled in a project's `check.disable` are reported as
    /// skipped. A plugin that fails entirely is reported as one error.
    #[must_use]
    pub fn run(&self, repository: &Repository) -> CheckReport {
        let mut outcomes = Vec::new();

        for project in repository.projects() {
            let config = &project.config().check;
            for plugin in self.plugins.check_plugins() {
                let checks = match plugin.get_checks(project) {
                    Ok(checks) => checks,
                    Err(e) => {
                        warn!(
                            plugin = plugin.name(),
                            project = project.id(),
                            error = %e,
                            "check plugin failed"
                        );
                        vec![Check::error("plugin", format!("plugin failed: {e}"))]
                    }
                };

                for mut check in checks {
                    if config.is_disabled(plugin.name(), &check.name) {
                        debug!(plugin = plugin.name(), check = %check.name, "check disabled");
                        check = Check::skipped(check.name, "disabled in configuration");
                    }
                    outcomes.push(CheckOutcome {
                        project: project.id().to_string(),
                        plugin: plugin.name().to_string(),
                        check,
                    });
                }
            }
        }

        outcomes.sort_by(|a, b| {
            (&a.project, &a.plugin, &a.check.name).cmp(&(&b.project, &b.plugin, &b.check.name))
        });
        CheckReport { outcomes }
    }
}
