use std::path::PathBuf;

/// Mistakes in a completion grammar. These point at the grammar author,
/// never at the user typing on the command line.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("`{primitive}` requires a body but none was given")]
    MissingBody { primitive: &'static str },
    #[error("`{primitive}` used outside of {context}")]
    MisplacedSignal {
        primitive: &'static str,
        context: &'static str,
    },
    #[error("`{primitive}` cannot match a word against a {kind} term")]
    UnsupportedCondition {
        primitive: &'static str,
        kind: &'static str,
    },
    #[error("unknown grammar `{name}`{}", .hint.as_ref().map(|h| format!(" (did you mean `{h}`?)")).unwrap_or_default())]
    UnknownGrammar { name: String, hint: Option<String> },
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid glob `{glob}`: {source}")]
    InvalidGlob {
        glob: String,
        #[source]
        source: globset::Error,
    },
    #[error("grammar calls nest deeper than {limit} (recursive `call` without consuming a word?)")]
    RecursionLimit { limit: usize },
    #[error("failed to parse grammar {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to read grammar {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
