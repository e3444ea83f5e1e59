use serde::{Deserialize, Serialize};

use crate::tokenizer::escape;

/// One completion suggestion for the word under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Candidate {
    pub value: String,
    /// Emit the value as-is instead of shell-escaping it.
    #[serde(skip_serializing_if = "is_false")]
    pub raw: bool,
    /// The value is a whole word; the shell should append a separator.
    pub completed: bool,
    /// Kept for bookkeeping, never printed.
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Skip prefix filtering against the cursor word.
    #[serde(skip_serializing_if = "is_false")]
    pub forced: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help: String,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            value: String::new(),
            raw: false,
            completed: true,
            hidden: false,
            forced: false,
            help: String::new(),
        }
    }
}

fn is_false(v: &bool) -> bool {
    !v
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// A prefix the user is expected to keep typing after, such as a directory.
    pub fn partial(value: impl Into<String>) -> Self {
        Self {
            completed: false,
            ..Self::new(value)
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Empty and whitespace-only values never reach the shell.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// The text handed to the shell's completion reply.
    pub fn formatted(&self) -> String {
        let mut out = if self.raw {
            self.value.clone()
        } else {
            escape(&self.value)
        };
        if self.completed {
            out.push(' ');
        }
        out
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
