//! Check command.

use anyhow::Result;
use clap::{ArgMatches, Args, FromArgMatches};
use colored::{ColoredString, Colorize};
use slap_core::{CheckOutcome, CheckRunner};
use slap_plugin::{
    ApplicationPlugin, CheckResult, Command, CommandContext, CommandRegistry, Plugin,
    PluginResult,
};
use slap_project::Repository;

use super::require_projects;

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Exit with status 1 if a check reports a warning
    #[arg(short, long)]
    pub warnings_as_errors: bool,

    /// Also list skipped checks
    #[arg(long)]
    pub show_skipped: bool,
}

/// Provides `slap check`.
pub struct CheckCommandPlugin;

impl Plugin for CheckCommandPlugin {
    fn name(&self) -> &'static str {
        "check"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Runs the checks of all check plugins"
    }
}

impl ApplicationPlugin for CheckCommandPlugin {
    fn activate(
        &self,
        repository: &Repository,
        commands: &mut CommandRegistry,
    ) -> PluginResult<()> {
        let warnings_as_errors = repository
            .root_project()
            .is_some_and(|p| p.config().check.warnings_as_errors);
        commands.register(CheckCommand { warnings_as_errors })
    }
}

struct CheckCommand {
    warnings_as_errors: bool,
}

impl Command for CheckCommand {
    fn path(&self) -> &'static [&'static str] {
        &["check"]
    }

    fn definition(&self) -> clap::Command {
        CheckArgs::augment_args(
            clap::Command::new("check").about("Run sanity checks on the project(s)"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = CheckArgs::from_arg_matches(matches)?;
        require_projects(ctx)?;

        let report = CheckRunner::new(ctx.plugins).run(ctx.repository);
        let monorepo = ctx.repository.is_monorepo();

        for outcome in &report.outcomes {
            if outcome.check.result == CheckResult::Skipped && !args.show_skipped {
                continue;
            }
            println!("{}", format_outcome(outcome, monorepo));
            if let Some(details) = &outcome.check.details {
                for line in details.lines() {
                    println!("    {line}");
                }
            }
        }

        println!();
        println!(
            "{} ok, {} warning(s), {} error(s), {} skipped",
            report.count(CheckResult::Ok),
            report.count(CheckResult::Warning),
            report.count(CheckResult::Error),
            report.count(CheckResult::Skipped),
        );

        Ok(report.exit_code(args.warnings_as_errors || self.warnings_as_errors))
    }
}

fn colored_result(result: CheckResult) -> ColoredString {
    let label = format!("{:<7}", result.to_string());
    match result {
        CheckResult::Ok => label.green(),
        CheckResult::Skipped => label.dimmed(),
        CheckResult::Warning => label.yellow(),
        CheckResult::Error => label.red().bold(),
    }
}

fn format_outcome(outcome: &CheckOutcome, monorepo: bool) -> String {
    let id = if monorepo {
        format!("{}:{}", outcome.project, outcome.id())
    } else {
        outcome.id()
    };

    let result = colored_result(outcome.check.result);
    match &outcome.check.description {
        Some(description) => format!("{result} {id}: {description}"),
        None => format!("{result} {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slap_plugin::Check;

    fn outcome(check: Check) -> CheckOutcome {
        CheckOutcome {
            project: "demo".to_string(),
            plugin: "general".to_string(),
            check,
        }
    }

    #[test]
    fn test_format_outcome() {
        colored::control::set_override(false);
        let line = format_outcome(&outcome(Check::warning("readme", "no README found")), false);
        assert_eq!(line, "WARNING general:readme: no README found");
    }

    #[test]
    fn test_format_outcome_monorepo() {
        colored::control::set_override(false);
        let line = format_outcome(&outcome(Check::new("license", CheckResult::Ok)), true);
        assert_eq!(line, "OK      demo:general:license");
    }
}
