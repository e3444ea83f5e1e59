#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tabsmith::{Candidate, Grammar, Host};

/// In-memory host that records every external call it serves.
#[derive(Default)]
pub struct MockHost {
    pub entries: Vec<String>,
    pub outputs: HashMap<String, String>,
    pub env: BTreeMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockHost {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Host for MockHost {
    fn list_directory(&self, path_prefix: &str) -> Vec<String> {
        self.calls.borrow_mut().push(format!("ls {path_prefix}"));
        self.entries.clone()
    }

    fn run_command(&self, command_line: &str) -> String {
        self.calls.borrow_mut().push(format!("run {command_line}"));
        self.outputs.get(command_line).cloned().unwrap_or_default()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn env_var_names(&self) -> Vec<String> {
        self.env.keys().cloned().collect()
    }

    fn current_dir(&self) -> PathBuf {
        PathBuf::from("/work")
    }
}

pub fn words(ws: &[&str]) -> Vec<String> {
    ws.iter().map(|w| w.to_string()).collect()
}

/// Values the shell would see, in order.
pub fn visible(candidates: &[Candidate]) -> Vec<&str> {
    candidates
        .iter()
        .filter(|c| !c.hidden)
        .map(|c| c.value.as_str())
        .collect()
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Grammar {
    Grammar::from_path(&fixture_path(name)).unwrap()
}
