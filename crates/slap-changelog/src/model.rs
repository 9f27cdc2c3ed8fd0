//! Changelog data model.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The contents of a changelog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Changelog {
    /// Release date, unset for the unreleased changelog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,

    /// The entries, in insertion order.
    #[serde(default)]
    pub entries: Vec<ChangelogEntry>,
}

/// A single changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Unique entry id.
    pub id: String,

    /// Entry type, e.g. "feature" or "fix".
    #[serde(rename = "type")]
    pub kind: String,

    /// What changed.
    pub description: String,

    /// Comma separated author names.
    #[serde(default)]
    pub author: String,

    /// PR URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr: Option<String>,

    /// Issue URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl ChangelogEntry {
    /// Returns the individual authors.
    #[must_use]
    pub fn authors(&self) -> Vec<&str> {
        self.author
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }
}

/// On-disk layout: everything lives under a `[changelog]` table.
#[derive(Serialize, Deserialize)]
struct ChangelogFile {
    changelog: Changelog,
}

impl Changelog {
    /// Parses a changelog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid changelog.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: ChangelogFile = toml::from_str(content)?;
        Ok(file.changelog)
    }

    /// Serializes the changelog into its file format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ChangelogFile {
            changelog: self.clone(),
        })
    }

    /// Returns the entry with the given id.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&ChangelogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Sets the PR of every entry whose id is not in `known_ids`.
    ///
    /// Entries that already have a PR are only changed when `overwrite` is
    /// set. Returns the ids of the updated entries.
    pub fn assign_pr(
        &mut self,
        known_ids: &HashSet<String>,
        pr: &str,
        overwrite: bool,
    ) -> Vec<String> {
        let mut updated = Vec::new();
        for entry in &mut self.entries {
            if known_ids.contains(&entry.id) {
                continue;
            }
            if entry.pr.as_deref() == Some(pr) || (entry.pr.is_some() && !overwrite) {
                continue;
            }
            entry.pr = Some(pr.to_string());
            updated.push(entry.id.clone());
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, pr: Option<&str>) -> ChangelogEntry {
        ChangelogEntry {
            id: id.to_string(),
            kind: "fix".to_string(),
            description: "Fix it".to_string(),
            author: "alice".to_string(),
            pr: pr.map(String::from),
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_parse() {
        let content = r#"
            [changelog]
            release-date = "2022-01-17"

            [[changelog.entries]]
            id = "a1"
            type = "improvement"
            description = "Faster startup"
            author = "alice, bob"
            pr = "https://github.com/owner/repo/pull/13"
            issues = ["https://github.com/owner/repo/issues/4"]
        "#;

        let changelog = Changelog::from_toml(content).unwrap();
        assert_eq!(
            changelog.release_date,
            NaiveDate::from_ymd_opt(2022, 1, 17)
        );
        assert_eq!(changelog.entries.len(), 1);
        let entry = &changelog.entries[0];
        assert_eq!(entry.kind, "improvement");
        assert_eq!(entry.authors(), vec!["alice", "bob"]);
        assert_eq!(entry.issues.len(), 1);
    }

    #[test]
    fn test_parse_without_entries() {
        let changelog = Changelog::from_toml("[changelog]\n").unwrap();
        assert!(changelog.release_date.is_none());
        assert!(changelog.entries.is_empty());
    }

    #[test]
    fn test_parse_missing_table() {
        assert!(Changelog::from_toml("entries = []").is_err());
    }

    #[test]
    fn test_to_toml_layout() {
        let changelog = Changelog {
            release_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            entries: vec![entry("a1", None)],
        };
        let toml = changelog.to_toml().unwrap();
        assert!(toml.contains("[changelog]"));
        assert!(toml.contains("release-date = \"2024-03-01\""));
        assert!(toml.contains("[[changelog.entries]]"));
        assert!(toml.contains("type = \"fix\""));
        assert!(!toml.contains("pr ="));

        assert_eq!(Changelog::from_toml(&toml).unwrap(), changelog);
    }

    #[test]
    fn test_authors_ignores_blanks() {
        let mut e = entry("a1", None);
        e.author = " , ".to_string();
        assert!(e.authors().is_empty());
    }

    #[test]
    fn test_assign_pr() {
        let mut changelog = Changelog {
            release_date: None,
            entries: vec![
                entry("old", None),
                entry("new", None),
                entry("has-pr", Some("https://example.com/pull/1")),
            ],
        };
        let known: HashSet<String> = ["old".to_string()].into_iter().collect();

        let updated = changelog.assign_pr(&known, "https://example.com/pull/2", false);
        assert_eq!(updated, vec!["new"]);
        assert!(changelog.entry("old").unwrap().pr.is_none());
        assert_eq!(
            changelog.entry("has-pr").unwrap().pr.as_deref(),
            Some("https://example.com/pull/1")
        );

        let updated = changelog.assign_pr(&known, "https://example.com/pull/2", true);
        assert_eq!(updated, vec!["has-pr"]);
    }
}
