//! Everything outside the process the grammar may draw candidates from.
//!
//! The engine never calls these directly; grammar terms wrap them in lazy
//! producers so they only run once the cursor word is reached.

pub mod command;
pub mod environment;
pub mod filesystem;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

pub use command::{command_candidates, CommandRunner, CommandSource};
pub use environment::env_candidates;
pub use filesystem::{file_candidates, FileFilter};

/// The outside world, as seen by candidate sources. Implementations must
/// not fail: an unavailable resource simply yields nothing.
pub trait Host {
    /// Entries matching the directory part of `path_prefix`, each prefixed
    /// with that directory part. Directories end in `/`.
    fn list_directory(&self, path_prefix: &str) -> Vec<String>;
    /// Stdout of `command_line`, or an empty string on any failure.
    fn run_command(&self, command_line: &str) -> String;
    fn env_var(&self, name: &str) -> Option<String>;
    fn env_var_names(&self) -> Vec<String>;
    fn current_dir(&self) -> PathBuf;
}

/// Host backed by the real filesystem, environment and `sh`.
pub struct SystemHost {
    cwd: PathBuf,
    show_hidden: bool,
    runner: CommandRunner,
}

impl SystemHost {
    pub fn new(config: &Config) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            runner: CommandRunner::new(
                &config.commands.shell,
                Duration::from_millis(config.commands.timeout_ms),
                cwd.clone(),
            ),
            cwd,
            show_hidden: config.filesystem.show_hidden,
        }
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.runner = self.runner.with_cwd(cwd.clone());
        self.cwd = cwd;
        self
    }
}

impl Host for SystemHost {
    fn list_directory(&self, path_prefix: &str) -> Vec<String> {
        filesystem::list_directory(path_prefix, &self.cwd, self.show_hidden)
    }

    fn run_command(&self, command_line: &str) -> String {
        self.runner.run(command_line)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn env_var_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::env::vars_os()
            .filter_map(|(k, _)| k.into_string().ok())
            .collect();
        names.sort();
        names
    }

    fn current_dir(&self) -> PathBuf {
        self.cwd.clone()
    }
}
