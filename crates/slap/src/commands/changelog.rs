//! Changelog commands.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgMatches, Args, FromArgMatches};
use colored::Colorize;
use semver::Version;
use slap_changelog::{Changelog, ChangelogManager, render_markdown, render_terminal};
use slap_core::{changelog_manager, resolve_vcs_host};
use slap_plugin::{
    ApplicationPlugin, Command, CommandContext, CommandRegistry, Plugin, PluginResult,
};
use slap_project::{Project, Repository};
use tracing::{debug, info};

use super::{main_project, require_projects};

/// Provides `slap changelog add|update-pr|format`.
pub struct ChangelogCommandPlugin;

impl Plugin for ChangelogCommandPlugin {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Manages structured TOML changelogs"
    }
}

impl ApplicationPlugin for ChangelogCommandPlugin {
    fn activate(
        &self,
        _repository: &Repository,
        commands: &mut CommandRegistry,
    ) -> PluginResult<()> {
        commands.register(AddCommand)?;
        commands.register(UpdatePrCommand)?;
        commands.register(FormatCommand)
    }
}

fn manager_for(ctx: &CommandContext<'_>, project: &Project) -> ChangelogManager {
    changelog_manager(project, resolve_vcs_host(Some(project), ctx.git, ctx.plugins))
}

fn display_path(ctx: &CommandContext<'_>, path: &Path) -> String {
    path.strip_prefix(ctx.cwd)
        .or_else(|_| path.strip_prefix(ctx.repository.directory()))
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Arguments for `changelog add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// The type of the change
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: String,

    /// A description of the change
    #[arg(short, long)]
    pub description: String,

    /// The author of the change (defaults to the Git user.email)
    #[arg(short, long)]
    pub author: Option<String>,

    /// The PR that contains the change (number or URL)
    #[arg(long)]
    pub pr: Option<String>,

    /// An issue related to the change (number or URL)
    #[arg(short, long = "issue", value_name = "ISSUE")]
    pub issues: Vec<String>,

    /// Commit the changelog file
    #[arg(short, long)]
    pub commit: bool,
}

struct AddCommand;

impl Command for AddCommand {
    fn path(&self) -> &'static [&'static str] {
        &["changelog", "add"]
    }

    fn definition(&self) -> clap::Command {
        AddArgs::augment_args(
            clap::Command::new("add").about("Add an entry to the unreleased changelog"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = AddArgs::from_arg_matches(matches)?;
        let project = main_project(ctx)?;
        let manager = manager_for(ctx, project);

        let git = if args.commit {
            Some(ctx.require_git().context("--commit requires a git repository")?)
        } else {
            ctx.git
        };

        let author = match args.author {
            Some(author) => author,
            None => git
                .and_then(|g| g.author().ok().flatten())
                .and_then(|a| a.email)
                .context("no author given and the Git user.email is not set, use --author")?,
        };

        let entry = manager.make_entry(
            &args.kind,
            &args.description,
            &author,
            args.pr.as_deref(),
            &args.issues,
        )?;
        let mut unreleased = manager.unreleased()?;
        unreleased.content.entries.push(entry.clone());
        unreleased.save()?;
        info!(id = %entry.id, path = %unreleased.path.display(), "added changelog entry");

        println!(
            "Added {} to {}",
            format!("{} - {}", entry.kind, entry.description).bold(),
            display_path(ctx, &unreleased.path)
        );

        if let Some(git) = git.filter(|_| args.commit) {
            let toplevel = git
                .path()
                .canonicalize()
                .unwrap_or_else(|_| git.path().to_path_buf());
            let message = commit_message(
                project.directory(),
                &toplevel,
                &args.kind,
                &args.description,
            );
            let commit =
                git.commit_files(std::slice::from_ref(&unreleased.path), &message, None, None)?;
            debug!(%commit, %message, "committed changelog entry");
        }

        Ok(0)
    }
}

/// `<type>: <description>`, prefixed with `<dir>/: ` for projects below the
/// git top level.
fn commit_message(project_dir: &Path, toplevel: &Path, kind: &str, description: &str) -> String {
    let message = format!("{kind}: {description}");
    let relative = project_dir
        .strip_prefix(toplevel)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let relative = relative.trim_matches('/');
    if relative.is_empty() {
        message
    } else {
        format!("{relative}/: {message}")
    }
}

/// Arguments for `changelog update-pr`.
#[derive(Debug, Args)]
pub struct UpdatePrArgs {
    /// The revision to compare against; entries added since get the PR
    #[arg(conflicts_with_all = ["list", "use_plugin"])]
    pub base_revision: Option<String>,

    /// The PR to assign (number or URL)
    #[arg(conflicts_with_all = ["list", "use_plugin"])]
    pub pr: Option<String>,

    /// Do not write any changes
    #[arg(short, long, conflicts_with_all = ["list", "use_plugin"])]
    pub dry: bool,

    /// Replace PR references that are already set
    #[arg(long, conflicts_with_all = ["list", "use_plugin"])]
    pub overwrite: bool,

    /// Commit the changes
    #[arg(short, long, conflicts_with_all = ["list", "use_plugin"])]
    pub commit: bool,

    /// Push the commit to the default remote
    #[arg(short, long, requires = "commit")]
    pub push: bool,

    /// Override the Git user.name of the commit
    #[arg(long, requires = "commit")]
    pub name: Option<String>,

    /// Override the Git user.email of the commit
    #[arg(long, requires = "commit")]
    pub email: Option<String>,

    /// Take the base revision and PR from a changelog automation plugin and
    /// let it publish the changes
    #[arg(long = "use", value_name = "PLUGIN", conflicts_with = "list")]
    pub use_plugin: Option<String>,

    /// List the changelog automation plugins
    #[arg(short, long)]
    pub list: bool,
}

struct UpdatePrCommand;

impl Command for UpdatePrCommand {
    fn path(&self) -> &'static [&'static str] {
        &["changelog", "update-pr"]
    }

    fn definition(&self) -> clap::Command {
        UpdatePrArgs::augment_args(
            clap::Command::new("update-pr")
                .about("Set the PR of changelog entries added since a revision"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = UpdatePrArgs::from_arg_matches(matches)?;

        if args.list {
            for automation in ctx.plugins.automations() {
                println!("  {}  {}", automation.name().green(), automation.description());
            }
            return Ok(0);
        }

        require_projects(ctx)?;
        let git = ctx.require_git()?;

        let automation = args
            .use_plugin
            .as_deref()
            .map(|name| ctx.plugins.automation(name))
            .transpose()?;
        let (base_revision, pr) = match (automation, args.base_revision, args.pr) {
            (Some(automation), _, _) => {
                info!(plugin = automation.name(), "using changelog automation");
                (automation.base_ref()?, automation.pr()?)
            }
            (None, Some(base_revision), Some(pr)) => (base_revision, pr),
            (None, _, _) => bail!("BASE_REVISION and PR are required unless --use is given"),
        };

        let mut changed_files: Vec<PathBuf> = Vec::new();
        let mut updates = 0;

        for project in ctx.repository.projects() {
            let manager = manager_for(ctx, project);
            if manager.is_readonly() {
                continue;
            }
            let mut unreleased = manager.unreleased()?;
            if !unreleased.exists() || changed_files.contains(&unreleased.path) {
                continue;
            }

            let pr = manager.vcs_host().normalize_pr(&pr)?;
            let known = entry_ids_at(git, &base_revision, &unreleased.path)?;
            let updated = unreleased.content.assign_pr(&known, &pr, args.overwrite);
            if updated.is_empty() {
                continue;
            }

            println!(
                "update {} ({} reference{})",
                display_path(ctx, &unreleased.path),
                updated.len(),
                if updated.len() == 1 { "" } else { "s" }
            );
            updates += updated.len();
            if !args.dry {
                unreleased.save()?;
            }
            changed_files.push(unreleased.path.clone());
        }

        if updates == 0 {
            println!("no entries to update");
            return Ok(0);
        }
        if args.dry {
            return Ok(0);
        }

        if args.commit {
            let message = format!(
                "update {updates} PR reference{}",
                if updates == 1 { "" } else { "s" }
            );
            git.commit_files(
                &changed_files,
                &message,
                args.name.as_deref(),
                args.email.as_deref(),
            )?;
            if args.push {
                let remote = git
                    .default_remote()?
                    .context("cannot push, no git remote configured")?;
                let branch = git
                    .current_branch()
                    .context("cannot push from a detached HEAD")?;
                git.push(&remote.name, &[branch])?;
            }
        }

        if let Some(automation) = automation {
            automation.publish_changes(git, &changed_files)?;
        }

        Ok(0)
    }
}

/// Returns the entry ids of the changelog file at `revision`.
fn entry_ids_at(
    git: &slap_git::Repository,
    revision: &str,
    path: &Path,
) -> Result<HashSet<String>> {
    let Some(bytes) = git.file_contents_at(revision, path)? else {
        return Ok(HashSet::new());
    };
    let content = String::from_utf8(bytes)
        .with_context(|| format!("{revision}:{} is not valid UTF-8", path.display()))?;
    let changelog = Changelog::from_toml(&content)
        .with_context(|| format!("failed to parse {revision}:{}", path.display()))?;
    Ok(changelog.entries.into_iter().map(|e| e.id).collect())
}

/// Arguments for `changelog format`.
#[derive(Debug, Args)]
pub struct FormatArgs {
    /// The version to format (defaults to the unreleased changelog)
    pub version: Option<String>,

    /// Render Markdown instead of terminal output
    #[arg(short, long)]
    pub markdown: bool,

    /// Render all changelogs, newest first
    #[arg(short, long, conflicts_with = "version")]
    pub all: bool,
}

struct FormatCommand;

impl Command for FormatCommand {
    fn path(&self) -> &'static [&'static str] {
        &["changelog", "format"]
    }

    fn definition(&self) -> clap::Command {
        FormatArgs::augment_args(
            clap::Command::new("format").about("Render changelogs for the terminal or as Markdown"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = FormatArgs::from_arg_matches(matches)?;
        let project = main_project(ctx)?;
        let manager = manager_for(ctx, project);

        let changelogs = if args.all {
            manager.all()?
        } else if let Some(version) = &args.version {
            let parsed = Version::parse(version)
                .with_context(|| format!("invalid version '{version}'"))?;
            let changelog = manager.version(&parsed)?;
            if !changelog.exists() {
                bail!("changelog for version {version} does not exist");
            }
            vec![changelog]
        } else {
            vec![manager.unreleased()?]
        };

        for changelog in &changelogs {
            if args.markdown {
                print!("{}", render_markdown(changelog, manager.vcs_host()));
            } else {
                print!("{}", render_terminal(changelog));
            }
            println!();
        }
        Ok(0)
    }
}
