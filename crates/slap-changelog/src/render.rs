//! Changelog rendering.

use slap_plugin::VcsHost;

use crate::ManagedChangelog;

fn heading(changelog: &ManagedChangelog) -> String {
    match changelog.content.release_date {
        Some(date) => format!("{} ({date})", changelog.label()),
        None => changelog.label(),
    }
}

/// Renders a changelog for the terminal.
#[must_use]
pub fn render_terminal(changelog: &ManagedChangelog) -> String {
    let mut out = heading(changelog);
    out.push('\n');

    for entry in &changelog.content.entries {
        out.push_str(&format!("  {} - {}", entry.kind, entry.description));
        let authors = entry.authors();
        if !authors.is_empty() {
            out.push_str(&format!(" ({})", authors.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// Renders a changelog as a Markdown section with an HTML table.
///
/// PR and issue links use the host's short forms, falling back to "Link".
#[must_use]
pub fn render_markdown(changelog: &ManagedChangelog, host: &dyn VcsHost) -> String {
    let mut out = format!("## {}\n\n", heading(changelog));

    out.push_str("<table>\n");
    out.push_str(
        "  <tr><th>Type</th><th>Description</th><th>PR</th><th>Issues</th><th>Author</th></tr>\n",
    );
    for entry in &changelog.content.entries {
        let pr = entry
            .pr
            .as_deref()
            .map(|url| link(url, host.pr_shortform(url)))
            .unwrap_or_default();
        let issues = entry
            .issues
            .iter()
            .map(|url| link(url, host.issue_shortform(url)))
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "  <tr><td>{}</td><td>{}</td><td>{pr}</td><td>{issues}</td><td>{}</td></tr>\n",
            escape(&entry.kind),
            escape(&entry.description),
            escape(&entry.authors().join(", ")),
        ));
    }
    out.push_str("</table>\n");
    out
}

fn link(url: &str, short: Option<String>) -> String {
    let text = short.unwrap_or_else(|| "Link".to_string());
    format!("<a href=\"{}\">{}</a>", escape(url), escape(&text))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
