//! General project checks: README, license and changelog.

use std::fs;
use std::path::Path;

use slap_core::changelog_manager;
use slap_plugin::{Check, CheckPlugin, NullVcsHost, Plugin, PluginResult};
use slap_project::Project;
use tracing::debug;

/// Check plugin for basic project hygiene.
pub struct GeneralChecks;

impl GeneralChecks {
    /// Creates a new plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_readme(project: &Project) -> PluginResult<Check> {
        Ok(match find_file(project.directory(), &["readme"])? {
            Some(name) => Check::ok("readme", name),
            None => Check::warning("readme", "no README file"),
        })
    }

    fn check_license(project: &Project) -> PluginResult<Check> {
        if let Some(name) = find_file(project.directory(), &["license", "licence", "copying"])? {
            return Ok(Check::ok("license", name));
        }
        Ok(match declared_license(project) {
            Some(license) => Check::ok("license", format!("declared as {license}")),
            None => Check::warning("license", "no LICENSE file and no license declared"),
        })
    }

    fn check_changelog(project: &Project) -> Check {
        let manager = changelog_manager(project, Box::new(NullVcsHost));
        if manager.is_readonly() {
            return Check::skipped("changelog", "changelog disabled");
        }
        if !manager.directory().is_dir() {
            return Check::skipped("changelog", "no changelog directory");
        }

        let changelogs = match manager.all() {
            Ok(changelogs) => changelogs,
            Err(e) => {
                return Check::error("changelog", "failed to load changelogs")
                    .with_details(e.to_string());
            }
        };

        let mut problems = Vec::new();
        for changelog in &changelogs {
            let name = changelog
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            for problem in manager.validate(&changelog.content) {
                problems.push(format!("{name}: {problem}"));
            }
        }
        debug!(
            project = project.id(),
            files = changelogs.len(),
            problems = problems.len(),
            "validated changelogs"
        );

        if problems.is_empty() {
            Check::ok(
                "changelog",
                format!("{} changelog file(s) valid", changelogs.len()),
            )
        } else {
            Check::error("changelog", format!("{} problem(s) found", problems.len()))
                .with_details(problems.join("\n"))
        }
    }
}

impl Default for GeneralChecks {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for GeneralChecks {
    fn name(&self) -> &'static str {
        "general"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Checks for a README, a license and valid changelogs"
    }
}

impl CheckPlugin for GeneralChecks {
    fn get_checks(&self, project: &Project) -> PluginResult<Vec<Check>> {
        Ok(vec![
            Self::check_readme(project)?,
            Self::check_license(project)?,
            Self::check_changelog(project),
        ])
    }
}

/// Returns the first file whose lowercase stem is one of `stems`.
fn find_file(dir: &Path, stems: &[&str]) -> PluginResult<Option<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    Ok(names.into_iter().find(|name| {
        let lower = name.to_lowercase();
        let stem = lower.split('.').next().unwrap_or_default();
        stems.contains(&stem)
    }))
}

/// Returns the license declared in the project's manifests.
fn declared_license(project: &Project) -> Option<String> {
    let document = project.document();
    let tables = [
        document.get("project"),
        document.get("tool").and_then(|t| t.get("poetry")),
    ];
    if let Some(license) = tables
        .into_iter()
        .flatten()
        .find_map(|t| t.get("license").and_then(license_value))
    {
        return Some(license);
    }

    let cargo = fs::read_to_string(project.directory().join("Cargo.toml")).ok();
    if let Some(cargo) = cargo.and_then(|c| c.parse::<toml::Table>().ok())
        && let Some(license) = cargo
            .get("package")
            .and_then(|p| p.get("license"))
            .and_then(license_value)
    {
        return Some(license);
    }

    let package_json = fs::read_to_string(project.directory().join("package.json")).ok()?;
    let json: serde_json::Value = serde_json::from_str(&package_json).ok()?;
    json.get("license")?.as_str().map(String::from)
}

/// Reads `license = "MIT"` or `license = { text = "MIT" }`.
fn license_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Table(t) => t
            .get("text")
            .or_else(|| t.get("file"))
            .and_then(toml::Value::as_str)
            .map(String::from),
        _ => None,
    }
}
