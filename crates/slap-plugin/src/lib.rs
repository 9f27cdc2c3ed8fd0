//! Plugin system for Slap.
//!
//! This crate provides the plugin traits and infrastructure:
//! - [`Plugin`]: Base trait for all plugins
//! - [`ApplicationPlugin`]: Contributes commands to the CLI
//! - [`CheckPlugin`]: Reports project sanity checks
//! - [`ReleasePlugin`]: Finds version references and finalizes releases
//! - [`VcsHostDetector`]: Resolves the remote VCS host of a project
//! - [`ChangelogAutomation`]: CI integration for changelog updates
//! - [`PluginRegistry`]: Holds every registered plugin by kind

mod command;
mod context;
mod error;
mod registry;
mod traits;

pub use command::{Command, CommandContext, CommandRegistry};
pub use context::ReleaseContext;
pub use error::{PluginError, PluginResult};
pub use registry::{PluginEntry, PluginKind, PluginRegistry};
pub use traits::Plugin;
pub use traits::application::ApplicationPlugin;
pub use traits::automation::ChangelogAutomation;
pub use traits::check::{Check, CheckPlugin, CheckResult};
pub use traits::release::{ReleasePlugin, VersionRef};
pub use traits::vcs::{NullVcsHost, VcsHost, VcsHostDetector};
