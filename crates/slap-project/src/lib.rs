//! Project model for Slap.
//!
//! A [`Repository`] is the directory Slap operates on. It holds a root
//! [`Project`] and, for monorepos, the member projects declared in the
//! root's `[workspace]` table.

mod error;
mod project;
mod repository;

pub use error::{ProjectError, ProjectResult};
pub use project::Project;
pub use repository::Repository;
