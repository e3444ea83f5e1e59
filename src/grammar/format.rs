//! On-disk grammar format, shared by YAML and TOML files.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::candidate::Candidate;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ignore_case: bool,
    pub main: Vec<NodeSpec>,
    #[serde(default)]
    pub grammars: BTreeMap<String, Vec<NodeSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSpec {
    Maybe(MaybeSpec),
    Must(Vec<TermSpec>),
    Offer(TermSpec),
    Skip,
    ForArg(ForArgSpec),
    Call(String),
    Break,
    Restart,
    Finish,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaybeSpec {
    pub terms: Vec<TermSpec>,
    #[serde(default)]
    pub then: Option<Vec<NodeSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForArgSpec {
    #[serde(default)]
    pub guard: Option<TermSpec>,
    #[serde(default)]
    pub body: Option<Vec<NodeSpec>>,
}

/// A word position: `"-h"`, `["build", "test"]`, or a one-key source map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Literal(String),
    Set(Vec<String>),
    Source(SourceSpec),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    Pattern(String),
    Candidates(Vec<CandidateSpec>),
    Files(FilesSpec),
    Env(EnvSpec),
    Command(CommandSpec),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CandidateSpec {
    Value(String),
    Full(Candidate),
}

impl From<CandidateSpec> for Candidate {
    fn from(spec: CandidateSpec) -> Self {
        match spec {
            CandidateSpec::Value(value) => Candidate::new(value),
            CandidateSpec::Full(candidate) => candidate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesSpec {
    pub glob: Option<String>,
    pub dirs_only: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvSpec {}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Full {
        run: String,
        #[serde(default)]
        split_on: Option<String>,
        #[serde(default)]
        strip_prefix: Option<String>,
    },
}
