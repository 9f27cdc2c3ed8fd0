//! GitHub support.
//!
//! - [`GithubDetector`] recognizes GitHub remotes and builds a
//!   [`GithubVcsHost`] that turns `#13` into PR and issue URLs.
//! - [`GithubActionsAutomation`] reads pull request information from the
//!   GitHub Actions environment for `slap changelog update-pr --use`.

mod actions;
mod host;

pub use actions::GithubActionsAutomation;
pub use host::{GithubDetector, GithubVcsHost};
