//! Structured changelogs for Slap.
//!
//! Each project keeps its changelog as TOML files in a directory (by default
//! `.changelog/`): `_unreleased.toml` collects entries until the next
//! release, which renames it to `<version>.toml`.

mod error;
mod manager;
mod model;
mod render;

pub use error::{ChangelogError, ChangelogResult};
pub use manager::{ChangelogManager, ManagedChangelog, UNRELEASED_FILE};
pub use model::{Changelog, ChangelogEntry};
pub use render::{render_markdown, render_terminal};
