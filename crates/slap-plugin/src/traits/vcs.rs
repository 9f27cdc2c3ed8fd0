//! Remote VCS host traits.

use slap_config::RemoteConfig;

use super::Plugin;
use crate::{PluginError, PluginResult};

/// A remote VCS host, used to normalize PR and issue references.
pub trait VcsHost: Send + Sync {
    /// Returns a human readable host name.
    fn name(&self) -> &str;

    /// Converts a PR reference (number, `#number` or URL) into a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not understood.
    fn normalize_pr(&self, pr: &str) -> PluginResult<String>;

    /// Converts an issue reference (number, `#number` or URL) into a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not understood.
    fn normalize_issue(&self, issue: &str) -> PluginResult<String>;

    /// Returns a short display form for a PR URL.
    fn pr_shortform(&self, url: &str) -> Option<String>;

    /// Returns a short display form for an issue URL.
    fn issue_shortform(&self, url: &str) -> Option<String>;
}

/// The host used when no remote could be detected.
///
/// Only full URLs are accepted and there are no short forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVcsHost;

impl NullVcsHost {
    fn require_url(reference: &str) -> PluginResult<String> {
        if reference.starts_with("https://") || reference.starts_with("http://") {
            Ok(reference.to_string())
        } else {
            Err(PluginError::InvalidReference(format!(
                "{reference} (no remote host detected, a full URL is required)"
            )))
        }
    }
}

impl VcsHost for NullVcsHost {
    fn name(&self) -> &str {
        "none"
    }

    fn normalize_pr(&self, pr: &str) -> PluginResult<String> {
        Self::require_url(pr)
    }

    fn normalize_issue(&self, issue: &str) -> PluginResult<String> {
        Self::require_url(issue)
    }

    fn pr_shortform(&self, _url: &str) -> Option<String> {
        None
    }

    fn issue_shortform(&self, _url: &str) -> Option<String> {
        None
    }
}

/// Resolves a [`VcsHost`] from configuration or a git remote URL.
pub trait VcsHostDetector: Plugin {
    /// Builds a host from an explicit `[remote]` configuration.
    ///
    /// Returns `None` if the configured type is not handled by this detector.
    fn from_config(&self, remote: &RemoteConfig) -> Option<Box<dyn VcsHost>>;

    /// Builds a host from a git remote URL.
    ///
    /// Returns `None` if the URL does not belong to this host.
    fn detect(&self, remote_url: &str) -> Option<Box<dyn VcsHost>>;
}
