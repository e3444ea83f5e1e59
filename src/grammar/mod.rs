//! Declarative completion grammars loaded from YAML or TOML files.

mod interpret;
pub mod format;

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::candidate::Candidate;
use crate::error::GrammarError;
use crate::sources::{CommandSource, FileFilter};

pub use interpret::Interpreter;
use format::{CommandSpec, ForArgSpec, GrammarFile, MaybeSpec, NodeSpec, SourceSpec, TermSpec};

/// A validated grammar, ready to run against the engine.
#[derive(Debug)]
pub struct Grammar {
    pub name: String,
    pub ignore_case: bool,
    main: Vec<Node>,
    grammars: HashMap<String, Vec<Node>>,
}

#[derive(Debug)]
pub(crate) enum Node {
    Maybe {
        terms: Vec<TermNode>,
        then: Option<Vec<Node>>,
    },
    Must(Vec<TermNode>),
    Offer(TermNode),
    Skip,
    ForArg {
        guard: Option<TermNode>,
        body: Vec<Node>,
    },
    Call(String),
    Break,
    Restart,
    Finish,
}

#[derive(Debug)]
pub(crate) enum TermNode {
    Literal(String),
    Set(Vec<String>),
    Pattern(Regex),
    Candidates(Vec<Candidate>),
    Files(FileFilter),
    Env,
    Command(CommandSource),
}

impl Grammar {
    /// Load a grammar file; `.toml` is read as TOML, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, GrammarError> {
        let contents = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        let parsed = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            parse_yaml(&contents).map_err(|e| e.to_string())
        };
        let file = parsed.map_err(|message| GrammarError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        let grammar = Self::compile(file)?;
        tracing::debug!(
            name = grammar.name.as_str(),
            path = %path.display(),
            sub_grammars = grammar.grammars.len(),
            "loaded grammar"
        );
        Ok(grammar)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, GrammarError> {
        let file = parse_yaml(contents).map_err(|e| GrammarError::Parse {
            path: "<yaml>".into(),
            message: e.to_string(),
        })?;
        Self::compile(file)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, GrammarError> {
        let file = toml::from_str(contents).map_err(|e| GrammarError::Parse {
            path: "<toml>".into(),
            message: e.to_string(),
        })?;
        Self::compile(file)
    }

    pub fn compile(file: GrammarFile) -> Result<Self, GrammarError> {
        let names: Vec<String> = file.grammars.keys().cloned().collect();
        let lower = Lowering { names: &names };

        let main = lower.nodes(file.main, Some(false))?;
        let mut grammars = HashMap::with_capacity(file.grammars.len());
        for (name, nodes) in file.grammars {
            // Sub-grammars may be called from inside a loop, so break/restart
            // placement is only checked when they run.
            let nodes = lower.nodes(nodes, None)?;
            grammars.insert(name, nodes);
        }

        Ok(Self {
            name: file.name,
            ignore_case: file.ignore_case,
            main,
            grammars,
        })
    }

    pub(crate) fn main(&self) -> &[Node] {
        &self.main
    }

    pub(crate) fn sub_grammar(&self, name: &str) -> Result<&[Node], GrammarError> {
        self.grammars
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| unknown_grammar(name, self.grammars.keys()))
    }

    pub fn sub_grammar_names(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }
}

/// Nodes and sources are written as one-key maps (`- for_arg: {...}`), which
/// plain serde_yml only accepts as `!tag` syntax.
fn parse_yaml(contents: &str) -> Result<GrammarFile, serde_yml::Error> {
    serde_yml::with::singleton_map_recursive::deserialize(serde_yml::Deserializer::from_str(contents))
}

fn unknown_grammar<'a>(name: &str, known: impl Iterator<Item = &'a String>) -> GrammarError {
    let hint = known
        .map(|k| (strsim::jaro_winkler(name, k), k))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.clone());
    GrammarError::UnknownGrammar {
        name: name.to_string(),
        hint,
    }
}

struct Lowering<'a> {
    names: &'a [String],
}

impl Lowering<'_> {
    /// `in_loop` is `None` when loop placement cannot be known statically.
    fn nodes(&self, specs: Vec<NodeSpec>, in_loop: Option<bool>) -> Result<Vec<Node>, GrammarError> {
        specs
            .into_iter()
            .map(|spec| self.node(spec, in_loop))
            .collect()
    }

    fn node(&self, spec: NodeSpec, in_loop: Option<bool>) -> Result<Node, GrammarError> {
        Ok(match spec {
            NodeSpec::Maybe(MaybeSpec { terms, then }) => {
                let then = match then {
                    Some(body) if body.is_empty() => {
                        return Err(GrammarError::MissingBody { primitive: "maybe" })
                    }
                    Some(body) => Some(self.nodes(body, in_loop)?),
                    None => None,
                };
                let terms = self.terms(terms)?;
                if let Some(first) = terms.first() {
                    check_matchable("maybe", first)?;
                }
                Node::Maybe { terms, then }
            }
            NodeSpec::Must(terms) => Node::Must(self.terms(terms)?),
            NodeSpec::Offer(term) => Node::Offer(self.term(term)?),
            NodeSpec::Skip => Node::Skip,
            NodeSpec::ForArg(ForArgSpec { guard, body }) => {
                let body = match body {
                    Some(body) if !body.is_empty() => body,
                    _ => return Err(GrammarError::MissingBody { primitive: "for_arg" }),
                };
                let guard = guard.map(|g| self.term(g)).transpose()?;
                if let Some(guard) = &guard {
                    check_matchable("for_arg", guard)?;
                }
                Node::ForArg {
                    guard,
                    body: self.nodes(body, in_loop.map(|_| true))?,
                }
            }
            NodeSpec::Call(name) => {
                if !self.names.contains(&name) {
                    return Err(unknown_grammar(&name, self.names.iter()));
                }
                Node::Call(name)
            }
            NodeSpec::Break => {
                check_loop("break", in_loop)?;
                Node::Break
            }
            NodeSpec::Restart => {
                check_loop("restart", in_loop)?;
                Node::Restart
            }
            NodeSpec::Finish => Node::Finish,
        })
    }

    fn terms(&self, specs: Vec<TermSpec>) -> Result<Vec<TermNode>, GrammarError> {
        specs.into_iter().map(|t| self.term(t)).collect()
    }

    fn term(&self, spec: TermSpec) -> Result<TermNode, GrammarError> {
        Ok(match spec {
            TermSpec::Literal(value) => TermNode::Literal(value),
            TermSpec::Set(values) => TermNode::Set(values),
            TermSpec::Source(SourceSpec::Pattern(pattern)) => {
                let regex = Regex::new(&pattern)
                    .map_err(|source| GrammarError::InvalidPattern { pattern, source })?;
                TermNode::Pattern(regex)
            }
            TermSpec::Source(SourceSpec::Candidates(values)) => {
                TermNode::Candidates(values.into_iter().map(Candidate::from).collect())
            }
            TermSpec::Source(SourceSpec::Files(files)) => {
                let filter = FileFilter {
                    dirs_only: files.dirs_only,
                    glob: None,
                };
                let filter = match files.glob {
                    Some(glob) => filter.with_glob(&glob)?,
                    None => filter,
                };
                TermNode::Files(filter)
            }
            TermSpec::Source(SourceSpec::Env(_)) => TermNode::Env,
            TermSpec::Source(SourceSpec::Command(CommandSpec::Line(run))) => {
                TermNode::Command(CommandSource::new(run))
            }
            TermSpec::Source(SourceSpec::Command(CommandSpec::Full {
                run,
                split_on,
                strip_prefix,
            })) => {
                let mut source = CommandSource::new(run);
                if let Some(split_on) = split_on {
                    source.split_on = split_on;
                }
                source.strip_prefix = strip_prefix;
                TermNode::Command(source)
            }
        })
    }
}

/// Sources only produce candidates at the cursor; they cannot decide
/// whether an already-typed word matches.
fn check_matchable(primitive: &'static str, term: &TermNode) -> Result<(), GrammarError> {
    let kind = match term {
        TermNode::Files(_) => "files source",
        TermNode::Env => "env source",
        TermNode::Command(_) => "command source",
        _ => return Ok(()),
    };
    Err(GrammarError::UnsupportedCondition { primitive, kind })
}

fn check_loop(primitive: &'static str, in_loop: Option<bool>) -> Result<(), GrammarError> {
    if in_loop == Some(false) {
        return Err(GrammarError::MisplacedSignal {
            primitive,
            context: "a for_arg loop",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_and_toml_compile_to_same_shape() {
        let yaml = Grammar::from_yaml_str(
            r#"
name: tool
main:
  - maybe: { terms: [["-h", "-v"]] }
  - must: [[build, test]]
"#,
        )
        .unwrap();
        let toml = Grammar::from_toml_str(
            r#"
name = "tool"
main = [
  { maybe = { terms = [["-h", "-v"]] } },
  { must = [["build", "test"]] },
]
"#,
        )
        .unwrap();
        assert_eq!(yaml.name, "tool");
        assert_eq!(toml.name, "tool");
        assert_eq!(yaml.main().len(), 2);
        assert_eq!(toml.main().len(), 2);
        assert!(matches!(&toml.main()[1], Node::Must(terms) if matches!(&terms[0], TermNode::Set(s) if s.len() == 2)));
    }

    #[test]
    fn test_for_arg_without_body_is_rejected() {
        let err = Grammar::from_yaml_str("main:\n  - for_arg: { guard: { pattern: '^-' } }\n")
            .unwrap_err();
        assert!(matches!(err, GrammarError::MissingBody { primitive: "for_arg" }));
    }

    #[test]
    fn test_empty_then_is_rejected() {
        let err = Grammar::from_yaml_str("main:\n  - maybe: { terms: [x], then: [] }\n").unwrap_err();
        assert!(matches!(err, GrammarError::MissingBody { primitive: "maybe" }));
    }

    #[test]
    fn test_break_at_top_level_is_rejected() {
        let err = Grammar::from_yaml_str("main:\n  - break\n").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::MisplacedSignal {
                primitive: "break",
                ..
            }
        ));
    }

    #[test]
    fn test_break_inside_loop_is_accepted() {
        Grammar::from_yaml_str("main:\n  - for_arg: { body: [break] }\n").unwrap();
    }

    #[test]
    fn test_unknown_call_suggests_close_name() {
        let err = Grammar::from_yaml_str(
            "main:\n  - call: biuld\ngrammars:\n  build:\n    - finish\n",
        )
        .unwrap_err();
        match err {
            GrammarError::UnknownGrammar { name, hint } => {
                assert_eq!(name, "biuld");
                assert_eq!(hint.as_deref(), Some("build"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Grammar::from_yaml_str("main:\n  - must: [{ pattern: '(' }]\n").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unsupported_term_type_is_rejected() {
        let err = Grammar::from_yaml_str("main:\n  - must: [42]\n").unwrap_err();
        assert!(matches!(err, GrammarError::Parse { .. }));
    }

    #[test]
    fn test_candidate_objects_keep_flags() {
        let grammar = Grammar::from_yaml_str(
            r#"
main:
  - offer:
      candidates:
        - plain
        - { value: "--out=", completed: false, help: "output path" }
"#,
        )
        .unwrap();
        match &grammar.main()[0] {
            Node::Offer(TermNode::Candidates(c)) => {
                assert_eq!(c[0], Candidate::new("plain"));
                assert_eq!(c[1].value, "--out=");
                assert!(!c[1].completed);
                assert_eq!(c[1].help, "output path");
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_map_form_nodes_and_sources() {
        let grammar = Grammar::from_yaml_str(
            r#"
name: demo
main:
  - for_arg:
      guard: { pattern: "^-" }
      body:
        - maybe: { terms: ["--out", { files: { glob: "*.txt" } }] }
        - maybe: { terms: ["--var", { env: {} }] }
        - maybe: { terms: ["--dev", { command: { run: "devices", split_on: "," } }] }
        - restart
  - offer: { command: "ls {1}" }
  - skip
  - call: sub
grammars:
  sub:
    - break
    - finish
"#,
        )
        .unwrap();
        assert_eq!(grammar.main().len(), 4);
        match &grammar.main()[0] {
            Node::ForArg {
                guard: Some(TermNode::Pattern(_)),
                body,
            } => {
                assert_eq!(body.len(), 4);
                assert!(matches!(
                    &body[0],
                    Node::Maybe { terms, then: None } if matches!(terms[1], TermNode::Files(_))
                ));
                assert!(matches!(&body[1], Node::Maybe { terms, .. } if matches!(terms[1], TermNode::Env)));
                assert!(matches!(
                    &body[2],
                    Node::Maybe { terms, .. } if matches!(&terms[1], TermNode::Command(c) if c.split_on == ",")
                ));
                assert!(matches!(body[3], Node::Restart));
            }
            other => panic!("unexpected node: {other:?}"),
        }
        assert!(matches!(&grammar.main()[1], Node::Offer(TermNode::Command(c)) if c.run == "ls {1}"));
        assert!(matches!(grammar.main()[2], Node::Skip));
        assert!(matches!(grammar.sub_grammar("sub").unwrap()[0], Node::Break));
    }

    #[test]
    fn test_tool_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tool.yaml");
        let grammar = Grammar::from_path(&path).unwrap();
        assert_eq!(grammar.name, "tool");
        assert_eq!(grammar.main().len(), 5);
        let mut subs: Vec<&str> = grammar.sub_grammar_names().collect();
        subs.sort_unstable();
        assert_eq!(subs, vec!["build", "run", "test"]);
    }

    #[test]
    fn test_source_cannot_lead_a_maybe() {
        let err = Grammar::from_yaml_str("main:\n  - maybe: { terms: [{ files: {} }, done] }\n")
            .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UnsupportedCondition {
                primitive: "maybe",
                kind: "files source"
            }
        ));

        let err = Grammar::from_yaml_str(
            "main:\n  - for_arg: { guard: { command: ls }, body: [skip] }\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UnsupportedCondition {
                primitive: "for_arg",
                kind: "command source"
            }
        ));

        // Later positions are fine: they are only offered at the cursor.
        Grammar::from_yaml_str("main:\n  - maybe: { terms: [--var, { env: {} }] }\n").unwrap();
        Grammar::from_yaml_str("main:\n  - must: [{ files: {} }]\n").unwrap();
    }
}
