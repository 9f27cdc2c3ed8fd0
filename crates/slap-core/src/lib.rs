//! Core library for Slap.
//!
//! This crate provides the application that hosts plugins and the logic
//! behind the built-in commands: checks, releases, tests and changelogs.

mod application;
mod changelog;
mod checks;
mod error;
mod release;
mod testing;
mod vcs;
mod version;

pub use application::Application;
pub use changelog::changelog_manager;
pub use checks::{CheckOutcome, CheckReport, CheckRunner};
pub use error::{CoreError, CoreResult};
pub use release::{CurrentVersion, ReleaseManager, ReleaseOutcome, ReleasePlan};
pub use testing::{Test, TestOutcome, TestRunner, TestSummary, collect_tests, select_tests};
pub use vcs::resolve_vcs_host;
pub use version::{BumpRule, VersionManager, apply_version_refs};
