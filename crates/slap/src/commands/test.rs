//! Test command.

use anyhow::{Result, bail};
use clap::{ArgMatches, Args, FromArgMatches};
use slap_core::{TestRunner, select_tests};
use slap_plugin::{
    ApplicationPlugin, Command, CommandContext, CommandRegistry, Plugin, PluginResult,
};
use slap_project::Repository;

use super::require_projects;

/// Arguments for the test command.
#[derive(Debug, Args)]
pub struct TestArgs {
    /// Tests to run. In a monorepo use `project:test`, `:test` or `project`.
    /// Runs all tests if omitted.
    #[arg(value_name = "TEST")]
    pub tests: Vec<String>,

    /// Do not prefix output lines with the test name
    #[arg(short = 's', long)]
    pub no_line_prefix: bool,
}

/// Provides `slap test`.
pub struct TestCommandPlugin;

impl Plugin for TestCommandPlugin {
    fn name(&self) -> &'static str {
        "test"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Runs the test commands configured in the [test] table"
    }
}

impl ApplicationPlugin for TestCommandPlugin {
    fn activate(
        &self,
        _repository: &Repository,
        commands: &mut CommandRegistry,
    ) -> PluginResult<()> {
        commands.register(TestCommand)
    }
}

struct TestCommand;

impl Command for TestCommand {
    fn path(&self) -> &'static [&'static str] {
        &["test"]
    }

    fn definition(&self) -> clap::Command {
        TestArgs::augment_args(clap::Command::new("test").about("Run the configured tests"))
    }

    fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let args = TestArgs::from_arg_matches(matches)?;
        require_projects(ctx)?;

        let tests = select_tests(ctx.repository, &args.tests)?;
        if tests.is_empty() {
            bail!("no tests configured");
        }

        let single = args.tests.len() == 1 && tests.len() == 1;
        let runner = TestRunner::new()
            .line_prefix(!args.no_line_prefix && !single)
            .qualified_names(ctx.repository.is_monorepo());

        let summary = runner.run(&tests, &mut std::io::stdout().lock())?;
        Ok(summary.exit_code())
    }
}
