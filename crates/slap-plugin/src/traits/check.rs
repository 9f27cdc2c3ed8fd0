//! Check plugin trait.

use std::fmt;

use slap_project::Project;

use super::Plugin;
use crate::PluginResult;

/// Outcome of a single check, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckResult {
    /// The check passed.
    Ok,
    /// The check does not apply to the project.
    Skipped,
    /// The check found something worth a look.
    Warning,
    /// The check failed.
    Error,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A named check and its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Check name, unique within its plugin.
    pub name: String,
    /// The result.
    pub result: CheckResult,
    /// One-line summary.
    pub description: Option<String>,
    /// Longer explanation, shown indented below the summary.
    pub details: Option<String>,
}

impl Check {
    /// Creates a check with the given result.
    #[must_use]
    pub fn new(name: impl Into<String>, result: CheckResult) -> Self {
        Self {
            name: name.into(),
            result,
            description: None,
            details: None,
        }
    }

    /// Creates a passing check.
    #[must_use]
    pub fn ok(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, CheckResult::Ok).with_description(description)
    }

    /// Creates a warning.
    #[must_use]
    pub fn warning(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, CheckResult::Warning).with_description(description)
    }

    /// Creates a failed check.
    #[must_use]
    pub fn error(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, CheckResult::Error).with_description(description)
    }

    /// Creates a skipped check.
    #[must_use]
    pub fn skipped(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, CheckResult::Skipped).with_description(description)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Reports sanity checks for a project.
pub trait CheckPlugin: Plugin {
    /// Runs the plugin's checks on a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the checks could not be run at all. Individual
    /// failures are reported as [`CheckResult::Error`] instead.
    fn get_checks(&self, project: &Project) -> PluginResult<Vec<Check>>;
}
