use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over `-v` and the config.
pub fn init_tracing(config: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => config.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(log_path) = &config.file {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RequestLogEntry<'a> {
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<&'a str>,
    pub cursor: usize,
    pub words: &'a [String],
    pub candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Appends one JSON line per completion request, rotating the file once it
/// grows past the configured size.
pub struct RequestLogger {
    log_path: PathBuf,
    max_size_mb: u64,
}

impl RequestLogger {
    pub fn new(log_path: PathBuf, max_size_mb: u64) -> Self {
        Self {
            log_path,
            max_size_mb,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        config
            .requests
            .clone()
            .map(|path| Self::new(path, config.max_size_mb))
    }

    pub fn log_request(
        &self,
        grammar: Option<&str>,
        words: &[String],
        cursor: usize,
        candidates: usize,
        error: Option<String>,
    ) {
        self.log(&RequestLogEntry {
            ts: Utc::now().to_rfc3339(),
            grammar,
            cursor,
            words,
            candidates,
            error,
        });
    }

    pub fn log(&self, entry: &RequestLogEntry<'_>) {
        if let Some(parent) = self.log_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create request log directory: {e}");
                return;
            }
        }

        if let Ok(meta) = std::fs::metadata(&self.log_path) {
            if meta.len() > self.max_size_mb * 1024 * 1024 {
                let rotated = self.log_path.with_extension("jsonl.1");
                if let Err(e) = std::fs::rename(&self.log_path, &rotated) {
                    tracing::warn!("Failed to rotate request log: {e}");
                }
            }
        }

        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
        {
            Ok(mut file) => {
                if let Ok(json) = serde_json::to_string(entry) {
                    if let Err(e) = writeln!(file, "{json}") {
                        tracing::warn!("Failed to write request log entry: {e}");
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to open request log: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_log_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("requests.jsonl");
        let logger = RequestLogger::new(path.clone(), 10);
        let words = vec!["tool".to_string(), "bu".to_string()];

        logger.log_request(Some("tool"), &words, 1, 1, None);
        logger.log_request(None, &words, 1, 0, Some("boom".into()));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["grammar"], "tool");
        assert_eq!(lines[0]["words"][1], "bu");
        assert!(lines[0].get("error").is_none());
        assert_eq!(lines[1]["error"], "boom");
    }

    #[test]
    fn test_request_log_rotates_when_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        std::fs::write(&path, "x".repeat(16)).unwrap();
        // A zero-megabyte cap rotates on any existing content.
        let logger = RequestLogger::new(path.clone(), 0);
        logger.log_request(None, &[], 0, 0, None);

        assert!(dir.path().join("requests.jsonl.1").exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
