//! Test selection and execution.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::Command;

use colored::{Color, Colorize};
use slap_project::Repository;
use tracing::debug;

use crate::{CoreError, CoreResult};

const PREFIX_COLORS: [Color; 4] = [Color::Blue, Color::Cyan, Color::Magenta, Color::Yellow];

/// A configured test command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    /// Id of the project declaring the test.
    pub project_id: String,
    /// Test name.
    pub name: String,
    /// Shell command.
    pub command: String,
    /// Directory the command runs in.
    pub directory: PathBuf,
}

impl Test {
    /// Returns `project:name`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}", self.project_id, self.name)
    }
}

/// Returns every configured test, in project order.
#[must_use]
pub fn collect_tests(repository: &Repository) -> Vec<Test> {
    repository
        .projects()
        .iter()
        .flat_map(|project| {
            project.config().test.iter().map(|(name, command)| Test {
                project_id: project.id().to_string(),
                name: name.clone(),
                command: command.clone(),
                directory: project.directory().to_path_buf(),
            })
        })
        .collect()
}

/// Selects tests by name.
///
/// In a monorepo a selector is `project:test`, `:test` (the test in every
/// project) or `project` (all of its tests). In a single project it is the
/// test name. No selectors select everything.
///
/// # Errors
///
/// Returns an error if a selector matches nothing.
pub fn select_tests(repository: &Repository, selectors: &[String]) -> CoreResult<Vec<Test>> {
    let all = collect_tests(repository);
    if selectors.is_empty() {
        return Ok(all);
    }

    let mut selected: Vec<Test> = Vec::new();
    for selector in selectors {
        let matches: Vec<&Test> = all
            .iter()
            .filter(|t| matches_selector(t, selector, repository.is_monorepo()))
            .collect();
        if matches.is_empty() {
            return Err(CoreError::UnknownTest(selector.clone()));
        }
        for test in matches {
            if !selected.contains(test) {
                selected.push(test.clone());
            }
        }
    }
    Ok(selected)
}

fn matches_selector(test: &Test, selector: &str, monorepo: bool) -> bool {
    if !monorepo {
        return test.name == selector;
    }
    match selector.split_once(':') {
        Some(("", name)) => test.name == name,
        Some((project, name)) => test.project_id == project && test.name == name,
        None => test.project_id == selector,
    }
}

/// The exit status of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Display name of the test.
    pub name: String,
    /// Exit code; 1 if the process was killed.
    pub exit_code: i32,
}

/// The results of a test run.
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    /// Outcomes in execution order.
    pub outcomes: Vec<TestOutcome>,
}

impl TestSummary {
    /// Returns 0 if every test passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.outcomes.iter().any(|o| o.exit_code != 0))
    }
}

/// Runs tests sequentially through `bash -c`.
#[derive(Debug, Clone)]
pub struct TestRunner {
    line_prefix: bool,
    qualified_names: bool,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    /// Creates a runner that prefixes output lines with the test name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_prefix: true,
            qualified_names: false,
        }
    }

    /// Enables or disables the `<name>| ` line prefix.
    #[must_use]
    pub fn line_prefix(mut self, enabled: bool) -> Self {
        self.line_prefix = enabled;
        self
    }

    /// Displays tests as `project:name` instead of `name`.
    #[must_use]
    pub fn qualified_names(mut self, enabled: bool) -> Self {
        self.qualified_names = enabled;
        self
    }

    fn display_name(&self, test: &Test) -> String {
        if self.qualified_names {
            test.id()
        } else {
            test.name.clone()
        }
    }

    /// Runs the tests, writing their output to `out`.
    ///
    /// A summary follows when more than one test ran.
    ///
    /// # Errors
    ///
    /// Returns an error if a process cannot be started or output cannot be
    /// written.
    pub fn run(&self, tests: &[Test], out: &mut impl Write) -> CoreResult<TestSummary> {
        let names: Vec<String> = tests.iter().map(|t| self.display_name(t)).collect();
        let width = names.iter().map(String::len).max().unwrap_or(0);
        let mut summary = TestSummary::default();

        for (index, (test, name)) in tests.iter().zip(&names).enumerate() {
            let prefix = if self.line_prefix {
                let color = PREFIX_COLORS[index % PREFIX_COLORS.len()];
                format!("{}| ", format!("{name:<width$}").color(color))
            } else {
                String::new()
            };

            let exit_code = run_one(test, &prefix, out)?;
            debug!(test = %name, exit_code, "test finished");
            summary.outcomes.push(TestOutcome {
                name: name.clone(),
                exit_code,
            });
        }

        if summary.outcomes.len() > 1 {
            writeln!(out)?;
            for outcome in &summary.outcomes {
                let status = if outcome.exit_code == 0 {
                    "OK".green()
                } else {
                    format!("FAILED (exit code {})", outcome.exit_code).red()
                };
                writeln!(out, "{:<width$}  {status}", outcome.name)?;
            }
        }
        out.flush()?;

        Ok(summary)
    }
}

fn run_one(test: &Test, prefix: &str, out: &mut impl Write) -> CoreResult<i32> {
    debug!(command = %test.command, directory = %test.directory.display(), "running test");

    let (reader, writer) = std::io::pipe()?;
    let mut command = Command::new("bash");
    command
        .arg("-c")
        .arg(&test.command)
        .current_dir(&test.directory)
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let mut child = command.spawn()?;
    // Close our copies of the write end so reading stops when the child exits.
    drop(command);

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        out.write_all(prefix.as_bytes())?;
        out.write_all(&line)?;
        if !line.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }

    let status = child.wait()?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn monorepo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("slap.toml"),
            "name = \"root\"\n[workspace]\nmembers = [\"a\", \"b\"]\n[test]\nlint = \"true\"\n",
        )
        .unwrap();
        for member in ["a", "b"] {
            let dir = temp_dir.path().join(member);
            fs::create_dir(&dir).unwrap();
            fs::write(
                dir.join("slap.toml"),
                "[test]\nunit = \"echo unit\"\nlint = \"echo lint\"\n",
            )
            .unwrap();
        }
        let repository = Repository::open(temp_dir.path()).unwrap();
        (temp_dir, repository)
    }

    fn ids(tests: &[Test]) -> Vec<String> {
        tests.iter().map(Test::id).collect()
    }

    fn test(name: &str, command: &str, dir: &std::path::Path) -> Test {
        Test {
            project_id: "demo".to_string(),
            name: name.to_string(),
            command: command.to_string(),
            directory: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_select_all() {
        let (_temp_dir, repository) = monorepo();
        let tests = select_tests(&repository, &[]).unwrap();
        assert_eq!(
            ids(&tests),
            vec!["root:lint", "a:lint", "a:unit", "b:lint", "b:unit"]
        );
    }

    #[test]
    fn test_select_project_and_test() {
        let (_temp_dir, repository) = monorepo();
        let tests = select_tests(&repository, &["a:unit".to_string()]).unwrap();
        assert_eq!(ids(&tests), vec!["a:unit"]);
        assert!(tests[0].directory.ends_with("a"));
    }

    #[test]
    fn test_select_test_in_all_projects() {
        let (_temp_dir, repository) = monorepo();
        let tests = select_tests(&repository, &[":unit".to_string()]).unwrap();
        assert_eq!(ids(&tests), vec!["a:unit", "b:unit"]);
    }

    #[test]
    fn test_select_project() {
        let (_temp_dir, repository) = monorepo();
        let tests =
            select_tests(&repository, &["b".to_string(), "b:unit".to_string()]).unwrap();
        assert_eq!(ids(&tests), vec!["b:lint", "b:unit"]);
    }

    #[test]
    fn test_select_unknown() {
        let (_temp_dir, repository) = monorepo();
        let result = select_tests(&repository, &["c:unit".to_string()]);
        assert!(matches!(result, Err(CoreError::UnknownTest(s)) if s == "c:unit"));
    }

    #[test]
    fn test_select_single_project_by_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("slap.toml"),
            "name = \"demo\"\n[test]\nunit = \"true\"\nlint = \"true\"\n",
        )
        .unwrap();
        let repository = Repository::open(temp_dir.path()).unwrap();

        let tests = select_tests(&repository, &["unit".to_string()]).unwrap();
        assert_eq!(ids(&tests), vec!["demo:unit"]);
        assert!(select_tests(&repository, &["demo".to_string()]).is_err());
        assert!(select_tests(&repository, &["demo:unit".to_string()]).is_err());
        assert!(select_tests(&repository, &[":unit".to_string()]).is_err());
    }

    #[test]
    fn test_run_with_prefix_and_summary() {
        colored::control::set_override(false);
        let temp_dir = TempDir::new().unwrap();
        let tests = vec![
            test("ok", "echo hello; echo oops >&2", temp_dir.path()),
            test("fail", "echo bye; exit 3", temp_dir.path()),
        ];

        let mut out = Vec::new();
        let summary = TestRunner::new().run(&tests, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("ok  | hello\n"));
        assert!(out.contains("ok  | oops\n"));
        assert!(out.contains("fail| bye\n"));
        assert!(out.contains("ok    OK"));
        assert!(out.contains("fail  FAILED (exit code 3)"));
        assert_eq!(summary.outcomes[1].exit_code, 3);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_run_single_without_prefix() {
        colored::control::set_override(false);
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("marker.txt"), "from cwd").unwrap();
        let tests = vec![test("cat", "cat marker.txt", temp_dir.path())];

        let mut out = Vec::new();
        let summary = TestRunner::new()
            .line_prefix(false)
            .run(&tests, &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(out, "from cwd\n");
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_qualified_names() {
        colored::control::set_override(false);
        let temp_dir = TempDir::new().unwrap();
        let tests = vec![test("unit", "echo x", temp_dir.path())];

        let mut out = Vec::new();
        TestRunner::new()
            .qualified_names(true)
            .run(&tests, &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "demo:unit| x\n");
    }
}
