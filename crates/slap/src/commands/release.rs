//! Release command.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{ArgMatches, Args, FromArgMatches};
use colored::Colorize;
use slap_core::{CurrentVersion, ReleaseManager, ReleaseOutcome, ReleasePlan};
use slap_plugin::{
    ApplicationPlugin, Command, CommandContext, CommandRegistry, Plugin, PluginResult, VersionRef,
};
use slap_project::Repository;

use super::require_projects;

/// Arguments for the release command.
#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// The new version, or a bump rule (major, minor, patch). Without it the
    /// version references are listed.
    pub version: Option<String>,

    /// Commit the changes and create a tag
    #[arg(short, long)]
    pub tag: bool,

    /// Push the commit and tag
    #[arg(short, long, requires = "tag")]
    pub push: bool,

    /// Remote to push to (defaults to origin or the only remote)
    #[arg(long, value_name = "NAME", requires = "push")]
    pub remote: Option<String>,

    /// Show what would change without modifying anything
    #[arg(short, long)]
    pub dry: bool,

    /// Allow versions that are inconsistent or not increasing, and replace
    /// an existing tag
    #[arg(short, long)]
    pub force: bool,

    /// Exit with status 1 if the version references are inconsistent
    #[arg(long, conflicts_with = "version")]
    pub validate: bool,

    /// Do not require the release branch
    #[arg(long)]
    pub no_branch_check: bool,

    /// Do not require a clean worktree
    #[arg(long)]
    pub no_worktree_check: bool,
}

/// Provides `slap release`.
pub struct ReleaseCommandPlugin;

impl Plugin for ReleaseCommandPlugin {
    fn name(&self) -> &'static str {
        "release"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Bumps version references and creates releases"
    }
}

impl ApplicationPlugin for ReleaseCommandPlugin {
    fn activate(
        &self,
        _repository: &Repository,
        commands: &mut CommandRegistry,
    ) -> PluginResult<()> {
        commands.register(ReleaseCommand)
    }
}

struct ReleaseCommand;

impl Command for ReleaseCommand {
    fn path(&self) -> &'static [&'static str] {
        &["release"]
    }

    fn definition(&self) -> clap::Command {
        ReleaseArgs::augment_args(
            clap::Command::new("release").about("Bump the version and create a release"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = ReleaseArgs::from_arg_matches(matches)?;
        require_projects(ctx)?;

        let manager = ReleaseManager::new(ctx.repository, ctx.plugins, ctx.git);

        let Some(target) = args.version.clone() else {
            let refs = manager
                .collect()
                .context("failed to collect version references")?;
            let current = ReleaseManager::current_version(&refs);
            print_refs(ctx.repository.directory(), &refs);
            println!();
            match &current {
                CurrentVersion::Missing => println!("No version references found."),
                CurrentVersion::Consistent(version) => {
                    println!("Current version: {}", version.bold());
                }
                CurrentVersion::Inconsistent(versions) => println!(
                    "{} {}",
                    "Inconsistent versions:".red(),
                    versions.join(", ")
                ),
            }
            let consistent = matches!(current, CurrentVersion::Consistent(_));
            return Ok(i32::from(args.validate && !consistent));
        };

        let plan = ReleasePlan {
            target,
            tag: args.tag,
            push: args.push,
            remote: args.remote,
            dry_run: args.dry,
            force: args.force,
            branch_check: !args.no_branch_check,
            worktree_check: !args.no_worktree_check,
        };
        let outcome = manager.release(&plan)?;
        print_outcome(ctx.repository.directory(), &outcome, plan.dry_run);
        Ok(0)
    }
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn print_refs(root: &Path, refs: &[VersionRef]) {
    let width = refs
        .iter()
        .map(|r| relative(root, &r.file).display().to_string().len())
        .max()
        .unwrap_or(0);
    for r in refs {
        let file = relative(root, &r.file).display().to_string();
        println!("  {file:<width$}  {}", r.value);
    }
}

fn print_outcome(root: &Path, outcome: &ReleaseOutcome, dry_run: bool) {
    let previous = outcome
        .previous
        .as_ref()
        .map_or_else(|| "?".to_string(), ToString::to_string);
    println!("Version: {previous} -> {}\n", outcome.version.to_string().bold());

    let verb = if dry_run { "Would update" } else { "Updated" };
    for file in &outcome.changed_files {
        println!("  {verb} {}", relative(root, file).display());
    }

    if let Some(commit) = &outcome.commit {
        println!("  Created commit {}", &commit[..commit.len().min(8)]);
    }
    if let Some(tag) = &outcome.tag {
        if dry_run {
            println!("  Would create tag {tag}");
        } else {
            println!("  Created tag {tag}");
        }
    }
    if let Some(remote) = &outcome.pushed_to {
        println!("  Pushed to {remote}");
    }

    println!();
    if dry_run {
        println!("Dry run completed. No changes were made.");
    } else {
        println!("Release {} completed successfully!", outcome.version);
    }
}
