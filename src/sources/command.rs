use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use moka::sync::Cache;
use regex::{Captures, Regex};
use tokio::process::Command;

use crate::candidate::Candidate;
use crate::config::MAX_COMMAND_OUTPUT_BYTES;

use super::Host;

/// Runs shell commands for dynamic candidates. Output is memoised per
/// command line, so a grammar may ask for the same list more than once.
pub struct CommandRunner {
    shell: String,
    timeout: Duration,
    cwd: PathBuf,
    cache: Cache<String, String>,
}

impl CommandRunner {
    pub fn new(shell: &str, timeout: Duration, cwd: PathBuf) -> Self {
        Self {
            shell: shell.to_string(),
            timeout,
            cwd,
            cache: Cache::builder().max_capacity(64).build(),
        }
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Stdout of `command_line`; empty on spawn failure, non-zero exit or timeout.
    pub fn run(&self, command_line: &str) -> String {
        if let Some(cached) = self.cache.get(command_line) {
            return cached;
        }
        let output = self.spawn(command_line);
        self.cache.insert(command_line.to_string(), output.clone());
        output
    }

    fn spawn(&self, command_line: &str) -> String {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::debug!("Failed to start command runtime: {err}");
                return String::new();
            }
        };

        let result = runtime.block_on(async {
            tokio::time::timeout(
                self.timeout,
                Command::new(&self.shell)
                    .arg("-c")
                    .arg(command_line)
                    .current_dir(&self.cwd)
                    .stdin(Stdio::null())
                    .kill_on_drop(true)
                    .output(),
            )
            .await
        });

        match result {
            Ok(Ok(output)) if output.status.success() => {
                let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                truncate_at_boundary(&mut stdout, MAX_COMMAND_OUTPUT_BYTES);
                tracing::debug!(command = command_line, bytes = stdout.len(), "command finished");
                stdout
            }
            Ok(Ok(output)) => {
                tracing::debug!(
                    command = command_line,
                    "Command failed ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                String::new()
            }
            Ok(Err(err)) => {
                tracing::debug!(command = command_line, "Command error: {err}");
                String::new()
            }
            Err(_) => {
                tracing::debug!(command = command_line, "Command timed out");
                String::new()
            }
        }
    }
}

fn truncate_at_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// A command whose output lines become candidates.
#[derive(Debug, Clone)]
pub struct CommandSource {
    /// Shell command; `{N}` is replaced by the quoted word at index N.
    pub run: String,
    pub split_on: String,
    pub strip_prefix: Option<String>,
}

impl CommandSource {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            split_on: "\n".into(),
            strip_prefix: None,
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder regex is valid"))
}

/// Substitute `{N}` placeholders with shell-quoted words.
pub fn expand_placeholders(template: &str, words: &[String]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            let word = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| words.get(i))
                .map(String::as_str)
                .unwrap_or("");
            shlex::try_quote(word)
                .map(|q| q.into_owned())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Run `source` through the host and turn each output item into a candidate.
pub fn command_candidates(host: &dyn Host, source: &CommandSource, words: &[String]) -> Vec<Candidate> {
    let command_line = expand_placeholders(&source.run, words);
    let stdout = host.run_command(&command_line);
    let split_on = if source.split_on.is_empty() {
        "\n"
    } else {
        source.split_on.as_str()
    };

    stdout
        .split(split_on)
        .filter_map(|item| {
            let mut item = item.trim();
            if let Some(prefix) = &source.strip_prefix {
                item = item.strip_prefix(prefix.as_str()).unwrap_or(item).trim();
            }
            if item.is_empty() {
                None
            } else {
                Some(Candidate::new(item))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_expand_placeholders_quotes_words() {
        let ws = words(&["git", "checkout", "my branch"]);
        assert_eq!(
            expand_placeholders("git log {1} -- {2}", &ws),
            "git log checkout -- 'my branch'"
        );
        assert_eq!(expand_placeholders("echo {9}", &ws), "echo ''");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let mut s = "héllo".to_string();
        truncate_at_boundary(&mut s, 2);
        assert_eq!(s, "h");
    }

    #[test]
    fn test_runner_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new("sh", Duration::from_secs(5), dir.path().to_path_buf());
        assert_eq!(runner.run("printf 'a\\nb\\n'"), "a\nb\n");
    }

    #[test]
    fn test_runner_failure_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new("sh", Duration::from_secs(5), dir.path().to_path_buf());
        assert_eq!(runner.run("echo partial; exit 3"), "");
        assert_eq!(runner.run("definitely-not-a-command-xyz"), "");
    }

    #[test]
    fn test_runner_timeout_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new("sh", Duration::from_millis(50), dir.path().to_path_buf());
        assert_eq!(runner.run("sleep 2; echo late"), "");
    }

    #[test]
    fn test_missing_shell_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new(
            "/nonexistent/shell",
            Duration::from_secs(1),
            dir.path().to_path_buf(),
        );
        assert_eq!(runner.run("echo hi"), "");
    }
}
