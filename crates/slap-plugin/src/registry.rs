//! Plugin registry.

use std::fmt;

use tracing::debug;

use crate::{
    ApplicationPlugin, ChangelogAutomation, CheckPlugin, Plugin, PluginError, PluginResult,
    ReleasePlugin, VcsHostDetector,
};

/// The kind of a registered plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginKind {
    /// Contributes commands.
    Application,
    /// Contributes checks.
    Check,
    /// Takes part in releases.
    Release,
    /// Detects the remote VCS host.
    VcsHost,
    /// CI integration for changelogs.
    ChangelogAutomation,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Application => "application",
            Self::Check => "check",
            Self::Release => "release",
            Self::VcsHost => "vcs-host",
            Self::ChangelogAutomation => "changelog-automation",
        };
        f.write_str(name)
    }
}

/// A registered plugin, as listed by `slap plugins`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    /// Plugin kind.
    pub kind: PluginKind,
    /// Plugin name.
    pub name: &'static str,
    /// Plugin version.
    pub version: &'static str,
    /// Plugin description.
    pub description: &'static str,
}

/// All registered plugins, one list per kind.
///
/// Registration order is preserved and names are unique per kind.
#[derive(Default)]
pub struct PluginRegistry {
    application: Vec<Box<dyn ApplicationPlugin>>,
    check: Vec<Box<dyn CheckPlugin>>,
    release: Vec<Box<dyn ReleasePlugin>>,
    vcs_hosts: Vec<Box<dyn VcsHostDetector>>,
    automations: Vec<Box<dyn ChangelogAutomation>>,
}

fn insert<T: Plugin + ?Sized>(
    list: &mut Vec<Box<T>>,
    plugin: Box<T>,
    kind: PluginKind,
) -> PluginResult<()> {
    if list.iter().any(|p| p.name() == plugin.name()) {
        return Err(PluginError::AlreadyRegistered(format!(
            "{kind} plugin '{}'",
            plugin.name()
        )));
    }
    debug!(%kind, name = plugin.name(), "registered plugin");
    list.push(plugin);
    Ok(())
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an application plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if an application plugin with the same name exists.
    pub fn register_application(
        &mut self,
        plugin: impl ApplicationPlugin + 'static,
    ) -> PluginResult<()> {
        let plugin: Box<dyn ApplicationPlugin> = Box::new(plugin);
        insert(&mut self.application, plugin, PluginKind::Application)
    }

    /// Registers a check plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if a check plugin with the same name exists.
    pub fn register_check(&mut self, plugin: impl CheckPlugin + 'static) -> PluginResult<()> {
        let plugin: Box<dyn CheckPlugin> = Box::new(plugin);
        insert(&mut self.check, plugin, PluginKind::Check)
    }

    /// Registers a release plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if a release plugin with the same name exists.
    pub fn register_release(&mut self, plugin: impl ReleasePlugin + 'static) -> PluginResult<()> {
        let plugin: Box<dyn ReleasePlugin> = Box::new(plugin);
        insert(&mut self.release, plugin, PluginKind::Release)
    }

    /// Registers a VCS host detector.
    ///
    /// # Errors
    ///
    /// Returns an error if a detector with the same name exists.
    pub fn register_vcs_host(
        &mut self,
        plugin: impl VcsHostDetector + 'static,
    ) -> PluginResult<()> {
        let plugin: Box<dyn VcsHostDetector> = Box::new(plugin);
        insert(&mut self.vcs_hosts, plugin, PluginKind::VcsHost)
    }

    /// Registers a changelog automation.
    ///
    /// # Errors
    ///
    /// Returns an error if an automation with the same name exists.
    pub fn register_automation(
        &mut self,
        plugin: impl ChangelogAutomation + 'static,
    ) -> PluginResult<()> {
        let plugin: Box<dyn ChangelogAutomation> = Box::new(plugin);
        insert(&mut self.automations, plugin, PluginKind::ChangelogAutomation)
    }

    /// Removes every plugin whose name is listed, whatever its kind.
    pub fn disable(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        let keep = |name: &str| {
            let disabled = names.iter().any(|n| n == name);
            if disabled {
                debug!(name, "disabled plugin");
            }
            !disabled
        };
        self.application.retain(|p| keep(p.name()));
        self.check.retain(|p| keep(p.name()));
        self.release.retain(|p| keep(p.name()));
        self.vcs_hosts.retain(|p| keep(p.name()));
        self.automations.retain(|p| keep(p.name()));
    }

    /// Returns the application plugins.
    #[must_use]
    pub fn application_plugins(&self) -> &[Box<dyn ApplicationPlugin>] {
        &self.application
    }

    /// Returns the check plugins.
    #[must_use]
    pub fn check_plugins(&self) -> &[Box<dyn CheckPlugin>] {
        &self.check
    }

    /// Returns the release plugins.
    #[must_use]
    pub fn release_plugins(&self) -> &[Box<dyn ReleasePlugin>] {
        &self.release
    }

    /// Returns the VCS host detectors.
    #[must_use]
    pub fn vcs_hosts(&self) -> &[Box<dyn VcsHostDetector>] {
        &self.vcs_hosts
    }

    /// Returns the changelog automations.
    #[must_use]
    pub fn automations(&self) -> &[Box<dyn ChangelogAutomation>] {
        &self.automations
    }

    /// Returns a changelog automation by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no automation has that name.
    pub fn automation(&self, name: &str) -> PluginResult<&dyn ChangelogAutomation> {
        self.automations
            .iter()
            .find(|p| p.name() == name)
            .map(AsRef::as_ref)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// Lists every registered plugin, grouped by kind.
    #[must_use]
    pub fn entries(&self) -> Vec<PluginEntry> {
        fn entry<T: Plugin + ?Sized>(kind: PluginKind, plugin: &T) -> PluginEntry {
            PluginEntry {
                kind,
                name: plugin.name(),
                version: plugin.version(),
                description: plugin.description(),
            }
        }

        let mut entries = Vec::new();
        entries.extend(
            self.application
                .iter()
                .map(|p| entry(PluginKind::Application, p.as_ref())),
        );
        entries.extend(self.check.iter().map(|p| entry(PluginKind::Check, p.as_ref())));
        entries.extend(
            self.release
                .iter()
                .map(|p| entry(PluginKind::Release, p.as_ref())),
        );
        entries.extend(
            self.vcs_hosts
                .iter()
                .map(|p| entry(PluginKind::VcsHost, p.as_ref())),
        );
        entries.extend(
            self.automations
                .iter()
                .map(|p| entry(PluginKind::ChangelogAutomation, p.as_ref())),
        );
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Check, CommandRegistry};
    use slap_project::{Project, Repository};

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn version(&self) -> &'static str {
            "0.1.0"
        }
    }

    impl CheckPlugin for Named {
        fn get_checks(&self, _project: &Project) -> PluginResult<Vec<Check>> {
            Ok(Vec::new())
        }
    }

    impl ReleasePlugin for Named {}

    impl ApplicationPlugin for Named {
        fn activate(
            &self,
            _repository: &Repository,
            _commands: &mut CommandRegistry,
        ) -> PluginResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = PluginRegistry::new();
        registry.register_check(Named("b")).unwrap();
        registry.register_check(Named("a")).unwrap();

        let names: Vec<&str> = registry.check_plugins().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_name_per_kind() {
        let mut registry = PluginRegistry::new();
        registry.register_check(Named("general")).unwrap();
        let result = registry.register_check(Named("general"));
        assert!(matches!(result, Err(PluginError::AlreadyRegistered(_))));

        // The same name may be used by a different kind.
        registry.register_release(Named("general")).unwrap();
    }

    #[test]
    fn test_disable() {
        let mut registry = PluginRegistry::new();
        registry.register_check(Named("general")).unwrap();
        registry.register_release(Named("general")).unwrap();
        registry.register_release(Named("changelog")).unwrap();

        registry.disable(&["general".to_string()]);
        assert!(registry.check_plugins().is_empty());
        assert_eq!(registry.release_plugins().len(), 1);
    }

    #[test]
    fn test_entries() {
        let mut registry = PluginRegistry::new();
        registry.register_release(Named("changelog")).unwrap();
        registry.register_application(Named("check")).unwrap();

        let entries = registry.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, PluginKind::Application);
        assert_eq!(entries[0].name, "check");
        assert_eq!(entries[1].kind, PluginKind::Release);
    }

    #[test]
    fn test_automation_not_found() {
        let registry = PluginRegistry::new();
        assert!(matches!(
            registry.automation("github-actions"),
            Err(PluginError::NotFound(_))
        ));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PluginKind::VcsHost.to_string(), "vcs-host");
        assert_eq!(
            PluginKind::ChangelogAutomation.to_string(),
            "changelog-automation"
        );
    }
}
