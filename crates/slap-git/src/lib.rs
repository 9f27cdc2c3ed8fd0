//! Git abstraction layer for Slap.
//!
//! This crate provides the Git operations Slap commands need:
//! - Repository discovery and author lookup
//! - Reading files at a revision
//! - Committing, tagging and pushing release changes

mod error;
mod repository;

pub use error::{GitError, GitResult};
pub use repository::{Author, Remote, Repository};
