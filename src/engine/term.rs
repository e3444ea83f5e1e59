use std::fmt;

use regex::Regex;

use crate::candidate::Candidate;
use crate::error::GrammarError;
use crate::matching::{exact_match, pattern_match, set_match};

/// What a grammar expects at one word position: something to match typed
/// words against, something to offer at the cursor, or both.
pub enum Term<'a> {
    Literal(String),
    Set(Vec<String>),
    /// Matches words but never offers anything.
    Pattern(Regex),
    Candidate(Candidate),
    Candidates(Vec<Candidate>),
    /// Producer run only when the cursor word is reached.
    Lazy(Box<dyn FnOnce() -> Vec<Candidate> + 'a>),
}

impl<'a> Term<'a> {
    pub fn lazy(producer: impl FnOnce() -> Vec<Candidate> + 'a) -> Self {
        Term::Lazy(Box::new(producer))
    }

    pub fn pattern(pattern: &str) -> Result<Self, GrammarError> {
        Regex::new(pattern)
            .map(Term::Pattern)
            .map_err(|source| GrammarError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Term::Literal(_) => "literal",
            Term::Set(_) => "set",
            Term::Pattern(_) => "pattern",
            Term::Candidate(_) => "candidate",
            Term::Candidates(_) => "candidate list",
            Term::Lazy(_) => "lazy source",
        }
    }

    /// Test an already-typed word. Lazy terms cannot be matched: running
    /// their producer while scanning would defeat the point of deferring it.
    pub fn matches(&self, word: &str, primitive: &'static str) -> Result<bool, GrammarError> {
        match self {
            Term::Literal(expected) => Ok(exact_match(expected, word)),
            Term::Set(members) => Ok(set_match(members, word)),
            Term::Pattern(pattern) => Ok(pattern_match(pattern, word)),
            Term::Candidate(candidate) => Ok(exact_match(&candidate.value, word)),
            Term::Candidates(candidates) => {
                Ok(candidates.iter().any(|c| exact_match(&c.value, word)))
            }
            Term::Lazy(_) => Err(GrammarError::UnsupportedCondition {
                primitive,
                kind: self.kind(),
            }),
        }
    }

    /// Everything this term offers for the cursor word, in order.
    pub fn collect(self) -> Vec<Candidate> {
        match self {
            Term::Literal(value) => vec![Candidate::new(value)],
            Term::Set(members) => members.into_iter().map(Candidate::new).collect(),
            Term::Pattern(_) => Vec::new(),
            Term::Candidate(candidate) => vec![candidate],
            Term::Candidates(candidates) => candidates,
            Term::Lazy(producer) => producer(),
        }
    }
}

impl fmt::Debug for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Term::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Term::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Term::Candidate(c) => f.debug_tuple("Candidate").field(c).finish(),
            Term::Candidates(c) => f.debug_tuple("Candidates").field(c).finish(),
            Term::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for Term<'_> {
    fn from(value: &str) -> Self {
        Term::Literal(value.to_string())
    }
}

impl From<String> for Term<'_> {
    fn from(value: String) -> Self {
        Term::Literal(value)
    }
}

impl From<&[&str]> for Term<'_> {
    fn from(values: &[&str]) -> Self {
        Term::Set(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Term<'_> {
    fn from(values: [&str; N]) -> Self {
        Term::Set(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<Vec<String>> for Term<'_> {
    fn from(values: Vec<String>) -> Self {
        Term::Set(values)
    }
}

impl From<Regex> for Term<'_> {
    fn from(pattern: Regex) -> Self {
        Term::Pattern(pattern)
    }
}

impl From<Candidate> for Term<'_> {
    fn from(candidate: Candidate) -> Self {
        Term::Candidate(candidate)
    }
}

impl From<Vec<Candidate>> for Term<'_> {
    fn from(candidates: Vec<Candidate>) -> Self {
        Term::Candidates(candidates)
    }
}
