//! Plugins command.

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use slap_plugin::{
    ApplicationPlugin, Command, CommandContext, CommandRegistry, Plugin, PluginEntry,
    PluginResult,
};
use slap_project::Repository;

/// Provides `slap plugins`.
pub struct PluginsCommandPlugin;

impl Plugin for PluginsCommandPlugin {
    fn name(&self) -> &'static str {
        "plugins"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Lists the registered plugins"
    }
}

impl ApplicationPlugin for PluginsCommandPlugin {
    fn activate(
        &self,
        _repository: &Repository,
        commands: &mut CommandRegistry,
    ) -> PluginResult<()> {
        commands.register(PluginsCommand)
    }
}

struct PluginsCommand;

impl Command for PluginsCommand {
    fn path(&self) -> &'static [&'static str] {
        &["plugins"]
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new("plugins").about("List the registered plugins")
    }

    fn run(&self, ctx: &CommandContext<'_>, _matches: &ArgMatches) -> Result<i32> {
        print!("{}", format_entries(&ctx.plugins.entries()));
        Ok(0)
    }
}

/// Groups plugin entries under a heading per kind.
fn format_entries(entries: &[PluginEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    let mut kind = None;

    for entry in entries {
        if kind != Some(entry.kind) {
            if kind.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", entry.kind.to_string().bold()));
            kind = Some(entry.kind);
        }
        let name = format!("{:<width$}", entry.name);
        out.push_str(&format!(
            "  {} {}  {}\n",
            name.green(),
            entry.version,
            entry.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use slap_plugin::PluginKind;

    #[test]
    fn test_format_entries() {
        colored::control::set_override(false);
        let entries = [
            PluginEntry {
                kind: PluginKind::Check,
                name: "general",
                version: "0.1.0",
                description: "General checks",
            },
            PluginEntry {
                kind: PluginKind::Check,
                name: "release",
                version: "0.1.0",
                description: "Release checks",
            },
            PluginEntry {
                kind: PluginKind::VcsHost,
                name: "github",
                version: "0.1.0",
                description: "GitHub",
            },
        ];

        assert_eq!(
            format_entries(&entries),
            "check\n  general 0.1.0  General checks\n  release 0.1.0  Release checks\n\nvcs-host\n  github  0.1.0  GitHub\n"
        );
    }
}
