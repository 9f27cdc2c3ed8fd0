//! Version reference detection plugin.
//!
//! Finds the version of a project in:
//! - `pyproject.toml` (`[project]` or `[tool.poetry]`)
//! - `Cargo.toml` (`[package]`)
//! - `package.json`
//! - `__version__ = "..."` in package `__init__.py` files
//! - every `release.references` entry of the project configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use slap_plugin::{Plugin, PluginError, PluginResult, ReleasePlugin, VersionRef};
use slap_project::Project;
use tracing::debug;

static TABLE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\s*([^\[\]]+?)\s*\]\s*(?:#.*)?$").expect("invalid regex"));

static ARRAY_TABLE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\[").expect("invalid regex"));

static TOML_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*version\s*=\s*["']([^"']+)["']"#).expect("invalid regex"));

static JSON_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""version"\s*:\s*"([^"]*)""#).expect("invalid regex"));

static DUNDER_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^__version__\s*(?::\s*str\s*)?=\s*["']([^"']+)["']"#).expect("invalid regex")
});

/// Regex fragment a `{version}` placeholder expands to.
const VERSION_TOKEN: &str = r"[0-9]+(?:\.[0-9A-Za-z+\-]+)*";

/// Release plugin detecting version references.
pub struct VersionRefsPlugin;

impl VersionRefsPlugin {
    /// Creates a new plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for VersionRefsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for VersionRefsPlugin {
    fn name(&self) -> &'static str {
        "version-refs"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Finds versions in pyproject.toml, Cargo.toml, package.json, __init__.py and configured files"
    }
}

impl ReleasePlugin for VersionRefsPlugin {
    fn get_version_refs(&self, project: &Project) -> PluginResult<Vec<VersionRef>> {
        let dir = project.directory();
        let mut refs = Vec::new();

        let pyproject = dir.join("pyproject.toml");
        if pyproject.is_file() {
            refs.extend(toml_version(&pyproject, &["project", "tool.poetry"])?);
        }

        let cargo = dir.join("Cargo.toml");
        if cargo.is_file() {
            refs.extend(toml_version(&cargo, &["package"])?);
        }

        let package_json = dir.join("package.json");
        if package_json.is_file() {
            refs.extend(package_json_version(&package_json)?);
        }

        for init in package_init_files(dir)? {
            refs.extend(dunder_version(&init)?);
        }

        for reference in &project.config().release.references {
            refs.extend(pattern_refs(&dir.join(&reference.file), &reference.pattern)?);
        }

        debug!(project = project.id(), count = refs.len(), "found version references");
        Ok(refs)
    }
}

fn read(path: &Path) -> PluginResult<String> {
    fs::read_to_string(path).map_err(|e| {
        PluginError::ExecutionFailed(format!("failed to read {}: {e}", path.display()))
    })
}

/// Finds `version = "..."` directly inside one of the given TOML tables.
fn toml_version(path: &Path, tables: &[&str]) -> PluginResult<Vec<VersionRef>> {
    let content = read(path)?;
    let mut refs = Vec::new();
    let mut current_table: Option<String> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if ARRAY_TABLE_HEADER_RE.is_match(line) {
            current_table = None;
        } else if let Some(caps) = TABLE_HEADER_RE.captures(line.trim_end()) {
            current_table = Some(caps[1].replace(' ', ""));
        } else if current_table
            .as_deref()
            .is_some_and(|t| tables.contains(&t))
            && let Some(caps) = TOML_VERSION_RE.captures(line)
            && let Some(m) = caps.get(1)
        {
            refs.push(VersionRef::new(
                path,
                offset + m.start(),
                offset + m.end(),
                m.as_str(),
            ));
        }
        offset += line.len();
    }
    Ok(refs)
}

/// Finds the top-level `"version"` of a `package.json`.
fn package_json_version(path: &Path) -> PluginResult<Vec<VersionRef>> {
    let content = read(path)?;
    let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        PluginError::ExecutionFailed(format!("failed to parse {}: {e}", path.display()))
    })?;
    let Some(version) = json.get("version").and_then(|v| v.as_str()) else {
        return Ok(Vec::new());
    };

    Ok(JSON_VERSION_RE
        .captures_iter(&content)
        .filter(|caps| {
            caps.get(0)
                .is_some_and(|key| json_depth_at(&content, key.start()) == Some(1))
        })
        .filter_map(|caps| caps.get(1))
        .find(|m| m.as_str() == version)
        .map(|m| VersionRef::new(path, m.start(), m.end(), m.as_str()))
        .into_iter()
        .collect())
}

/// Returns the object/array nesting depth at `pos`, or `None` if `pos` lies
/// inside a string.
fn json_depth_at(content: &str, pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in content.bytes().enumerate() {
        if i == pos {
            return (!in_string).then_some(depth);
        }
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }
    None
}

/// Returns the `__init__.py` of every package in the project directory or
/// its `src/` directory.
fn package_init_files(dir: &Path) -> PluginResult<Vec<PathBuf>> {
    let mut result = Vec::new();
    for base in [dir.to_path_buf(), dir.join("src")] {
        if !base.is_dir() {
            continue;
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(&base)? {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            let init = path.join("__init__.py");
            if !hidden && init.is_file() {
                found.push(init);
            }
        }
        found.sort();
        result.extend(found);
    }
    Ok(result)
}

fn dunder_version(path: &Path) -> PluginResult<Vec<VersionRef>> {
    let content = read(path)?;
    Ok(DUNDER_VERSION_RE
        .captures_iter(&content)
        .filter_map(|caps| caps.get(1))
        .map(|m| VersionRef::new(path, m.start(), m.end(), m.as_str()))
        .collect())
}

/// Builds the regex of a configured reference pattern.
///
/// The literal `{version}` must appear exactly once and matches a version
/// token.
///
/// # Errors
///
/// Returns an error if the placeholder is missing or repeated, or the
/// pattern is not a valid regex.
pub fn compile_pattern(pattern: &str) -> PluginResult<Regex> {
    let parts: Vec<&str> = pattern.split("{version}").collect();
    if parts.len() != 2 {
        return Err(PluginError::ConfigError(format!(
            "pattern must contain {{version}} exactly once: {pattern}"
        )));
    }
    let source = format!("(?m){}(?P<version>{VERSION_TOKEN}){}", parts[0], parts[1]);
    Regex::new(&source)
        .map_err(|e| PluginError::ConfigError(format!("invalid pattern {pattern}: {e}")))
}

fn pattern_refs(path: &Path, pattern: &str) -> PluginResult<Vec<VersionRef>> {
    let regex = compile_pattern(pattern)?;
    if !path.is_file() {
        return Err(PluginError::ConfigError(format!(
            "version reference file not found: {}",
            path.display()
        )));
    }
    let content = read(path)?;
    Ok(regex
        .captures_iter(&content)
        .filter_map(|caps| caps.name("version"))
        .map(|m| VersionRef::new(path, m.start(), m.end(), m.as_str()))
        .collect())
}
