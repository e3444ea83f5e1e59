use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::candidate::Candidate;
use crate::error::GrammarError;

use super::Host;

#[derive(Debug, Clone)]
struct DirEntry {
    name: String,
    is_dir: bool,
}

#[derive(Debug)]
struct PathQuery {
    search_dir: PathBuf,
    typed_dir_part: String,
    include_hidden: bool,
}

fn resolve_dir_input(input: &str, cwd: &Path) -> PathBuf {
    let trimmed = input.trim_end_matches('/');

    if trimmed.is_empty() {
        // "/" trims to nothing but still names the root.
        return if input.starts_with('/') {
            PathBuf::from("/")
        } else {
            cwd.to_path_buf()
        };
    }

    if trimmed == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path = Path::new(trimmed);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn parse_path_query(partial: &str, cwd: &Path) -> PathQuery {
    let (typed_dir_part, file_prefix) = match partial.rfind('/') {
        Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
        None => ("", partial),
    };

    let search_dir = if typed_dir_part.is_empty() {
        cwd.to_path_buf()
    } else {
        resolve_dir_input(typed_dir_part, cwd)
    };

    PathQuery {
        search_dir,
        typed_dir_part: typed_dir_part.to_string(),
        include_hidden: file_prefix.starts_with('.'),
    }
}

fn read_dir_entries(dir: &Path) -> Vec<DirEntry> {
    let mut entries = match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                let is_dir = e
                    .file_type()
                    .map(|ft| ft.is_dir() || (ft.is_symlink() && e.path().is_dir()))
                    .unwrap_or(false);
                DirEntry { name, is_dir }
            })
            .collect::<Vec<_>>(),
        Err(err) => {
            tracing::debug!(path = %dir.display(), "failed to read directory: {err}");
            Vec::new()
        }
    };

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// List the directory named by the part of `partial` up to its last `/`.
/// Names keep that typed directory part so they extend what the user typed.
pub fn list_directory(partial: &str, cwd: &Path, show_hidden: bool) -> Vec<String> {
    let query = parse_path_query(partial, cwd);

    read_dir_entries(&query.search_dir)
        .into_iter()
        .filter(|entry| show_hidden || query.include_hidden || !entry.name.starts_with('.'))
        .map(|entry| {
            let suffix = if entry.is_dir { "/" } else { "" };
            format!("{}{}{}", query.typed_dir_part, entry.name, suffix)
        })
        .collect()
}

/// Which filesystem entries a `files` source offers.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub dirs_only: bool,
    /// Applied to file names; directories always pass so they can be entered.
    pub glob: Option<GlobMatcher>,
}

impl FileFilter {
    pub fn dirs() -> Self {
        Self {
            dirs_only: true,
            glob: None,
        }
    }

    pub fn with_glob(mut self, glob: &str) -> Result<Self, GrammarError> {
        let matcher = Glob::new(glob)
            .map_err(|source| GrammarError::InvalidGlob {
                glob: glob.to_string(),
                source,
            })?
            .compile_matcher();
        self.glob = Some(matcher);
        Ok(self)
    }

    fn accepts(&self, entry: &str) -> bool {
        if entry.ends_with('/') {
            return true;
        }
        if self.dirs_only {
            return false;
        }
        match &self.glob {
            Some(glob) => {
                let name = entry.rsplit('/').next().unwrap_or(entry);
                glob.is_match(name)
            }
            None => true,
        }
    }
}

/// Path candidates for the typed word. Directories are offered as
/// prefixes so the shell does not close the word after them.
pub fn file_candidates(host: &dyn Host, typed: &str, filter: &FileFilter) -> Vec<Candidate> {
    host.list_directory(typed)
        .into_iter()
        .filter(|entry| filter.accepts(entry))
        .map(|entry| {
            if entry.ends_with('/') {
                Candidate::partial(entry)
            } else {
                Candidate::new(entry)
            }
        })
        .collect()
}
