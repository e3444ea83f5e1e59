use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bound on nested `call` depth inside one grammar pass.
pub const MAX_CALL_DEPTH: usize = 64;
/// Largest command output (bytes) kept from a dynamic source.
pub const MAX_COMMAND_OUTPUT_BYTES: usize = 256 * 1024;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
    pub commands: CommandConfig,
    pub filesystem: FilesystemConfig,
    pub logging: LoggingConfig,
    /// Directories searched for `<command>.{yaml,yml,toml}` grammars.
    pub grammar_dirs: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct CompletionConfig {
    /// Compare the cursor word case-insensitively when filtering.
    pub ignore_case: bool,
    /// Cap on printed candidates; 0 means unlimited.
    pub max_candidates: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommandConfig {
    pub shell: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct FilesystemConfig {
    /// Offer dotfiles even when the typed name does not start with `.`.
    pub show_hidden: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Write diagnostics here instead of stderr.
    pub file: Option<PathBuf>,
    /// JSONL log of every completion request.
    pub requests: Option<PathBuf>,
    pub max_size_mb: u64,
}

// --- Defaults ---

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell: "sh".into(),
            timeout_ms: 2_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            file: None,
            requests: None,
            max_size_mb: 10,
        }
    }
}

// --- Methods ---

impl Config {
    pub fn default_path() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|d| PathBuf::from(d).join("tabsmith").join("config.toml"))
            .or_else(|| dirs::config_dir().map(|d| d.join("tabsmith").join("config.toml")))
            .unwrap_or_else(|| PathBuf::from("~/.config/tabsmith/config.toml"))
    }

    /// Load from `path` (or the default location). Problems are reported on
    /// stderr and the defaults are used instead.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => return config.with_default_grammar_dir(),
                    Err(e) => {
                        eprintln!("[tabsmith] Failed to parse {}: {e}", config_path.display());
                    }
                },
                Err(e) => {
                    eprintln!("[tabsmith] Failed to read {}: {e}", config_path.display());
                }
            }
        }

        Config::default().with_default_grammar_dir()
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn with_default_grammar_dir(mut self) -> Self {
        if self.grammar_dirs.is_empty() {
            if let Some(dir) = Self::default_path().parent() {
                self.grammar_dirs.push(dir.join("grammars"));
            }
        }
        self
    }

    /// Find the grammar file for `command` (a path or bare name).
    pub fn find_grammar(&self, command: &str) -> Option<PathBuf> {
        let name = Path::new(command).file_name()?.to_str()?;
        self.grammar_dirs.iter().find_map(|dir| {
            ["yaml", "yml", "toml"]
                .iter()
                .map(|ext| dir.join(format!("{name}.{ext}")))
                .find(|p| p.is_file())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.completion.ignore_case);
        assert_eq!(config.completion.max_candidates, 0);
        assert_eq!(config.commands.shell, "sh");
        assert_eq!(config.commands.timeout_ms, 2_000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [completion]
            ignore_case = true

            [commands]
            timeout_ms = 500
            "#,
        )
        .unwrap();
        assert!(config.completion.ignore_case);
        assert_eq!(config.commands.timeout_ms, 500);
        assert_eq!(config.commands.shell, "sh");
    }

    #[test]
    fn test_find_grammar_uses_basename() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("adb.yaml"), "name: adb\n").unwrap();
        let config = Config {
            grammar_dirs: vec![dir.path().to_path_buf()],
            ..Config::default()
        };
        assert_eq!(
            config.find_grammar("/usr/bin/adb"),
            Some(dir.path().join("adb.yaml"))
        );
        assert_eq!(config.find_grammar("git"), None);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml")));
        assert_eq!(config.commands.timeout_ms, 2_000);
        assert!(!config.grammar_dirs.is_empty());
    }
}
