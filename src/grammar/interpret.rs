use crate::candidate::Candidate;
use crate::config::MAX_CALL_DEPTH;
use crate::engine::{Engine, Step, Term};
use crate::error::GrammarError;
use crate::sources::{command_candidates, env_candidates, file_candidates, Host};

use super::{Grammar, Node, TermNode};

/// Runs a compiled [`Grammar`] against the engine, wiring its sources to a [`Host`].
pub struct Interpreter<'g> {
    grammar: &'g Grammar,
    host: &'g dyn Host,
}

impl<'g> Interpreter<'g> {
    pub fn new(grammar: &'g Grammar, host: &'g dyn Host) -> Self {
        Self { grammar, host }
    }

    /// Candidates for `words[cursor]`, hidden ones included.
    pub fn complete(
        &self,
        words: Vec<String>,
        cursor: usize,
        ignore_case: bool,
    ) -> Result<Vec<Candidate>, GrammarError> {
        let mut engine =
            Engine::new(words, cursor).with_ignore_case(ignore_case || self.grammar.ignore_case);
        engine.run(|e| self.exec(e, self.grammar.main(), 0))?;
        tracing::debug!(
            grammar = self.grammar.name.as_str(),
            cursor,
            candidates = engine.candidates().len(),
            "completion pass finished"
        );
        Ok(engine.into_candidates())
    }

    fn exec(&self, engine: &mut Engine, nodes: &[Node], depth: usize) -> Step {
        for node in nodes {
            self.exec_node(engine, node, depth)?;
        }
        Ok(())
    }

    fn exec_node(&self, engine: &mut Engine, node: &Node, depth: usize) -> Step {
        match node {
            Node::Maybe { terms, then } => {
                let terms = self.terms(engine, terms);
                match then {
                    Some(body) => engine
                        .maybe_seq_then(terms, |e| self.exec(e, body, depth))
                        .map(drop),
                    None => engine.maybe_seq(terms).map(drop),
                }
            }
            Node::Must(terms) => {
                let terms = self.terms(engine, terms);
                engine.must_seq(terms)
            }
            Node::Offer(term) => {
                let term = self.term(engine, term);
                engine.offer(term)
            }
            Node::Skip => engine.skip(),
            Node::ForArg { guard, body } => {
                let guard = guard.as_ref().map(|g| self.term(engine, g));
                engine.for_arg(guard, |e| self.exec(e, body, depth))
            }
            Node::Call(name) => {
                if depth >= MAX_CALL_DEPTH {
                    return Err(GrammarError::RecursionLimit {
                        limit: MAX_CALL_DEPTH,
                    }
                    .into());
                }
                let body = self.grammar.sub_grammar(name)?;
                tracing::trace!(grammar = name.as_str(), index = engine.index(), "call");
                self.exec(engine, body, depth + 1)
            }
            Node::Break => engine.brk(),
            Node::Restart => engine.restart(),
            Node::Finish => engine.finish(),
        }
    }

    fn terms<'a>(&'a self, engine: &Engine, nodes: &'a [TermNode]) -> Vec<Term<'a>> {
        nodes.iter().map(|n| self.term(engine, n)).collect()
    }

    /// External sources become lazy terms: they only run if the engine
    /// reaches the cursor word with them.
    fn term<'a>(&'a self, engine: &Engine, node: &'a TermNode) -> Term<'a> {
        match node {
            TermNode::Literal(value) => Term::Literal(value.clone()),
            TermNode::Set(values) => Term::Set(values.clone()),
            TermNode::Pattern(pattern) => Term::Pattern(pattern.clone()),
            TermNode::Candidates(candidates) => Term::Candidates(candidates.clone()),
            TermNode::Files(filter) => {
                let typed = engine.cursor_word().to_string();
                Term::lazy(move || file_candidates(self.host, &typed, filter))
            }
            TermNode::Env => {
                let typed = engine.cursor_word().to_string();
                Term::lazy(move || env_candidates(self.host, &typed))
            }
            TermNode::Command(source) => {
                let words = engine.words().to_vec();
                Term::lazy(move || command_candidates(self.host, source, &words))
            }
        }
    }
}
