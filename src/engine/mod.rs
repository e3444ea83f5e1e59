//! Walks a completion grammar in lockstep with the typed command line.
//!
//! Words before the cursor are scanned silently: each primitive either
//! consumes the word it expects or leaves it for the next alternative.
//! At the cursor word every reachable primitive contributes candidates.

mod term;

pub use term::Term;

use crate::candidate::Candidate;
use crate::error::GrammarError;
use crate::matching::prefix_match;

/// Control outcome threaded back through grammar blocks. `Ok` means keep going.
pub type Step<T = ()> = Result<T, Signal>;

#[derive(Debug)]
pub enum Signal {
    /// Leave the innermost `for_arg` loop.
    Break,
    /// Re-enter the innermost `for_arg` loop at the current word.
    Restart,
    /// End the whole pass.
    Finish,
    Fault(GrammarError),
}

impl From<GrammarError> for Signal {
    fn from(err: GrammarError) -> Self {
        Signal::Fault(err)
    }
}

#[derive(Debug)]
pub struct Engine {
    words: Vec<String>,
    cursor: usize,
    index: usize,
    candidates: Vec<Candidate>,
    ignore_case: bool,
    loop_depth: usize,
    in_pass: bool,
}

impl Engine {
    /// `words[0]` is the command name; `cursor` indexes the word being completed.
    /// A cursor at or past the end means a fresh empty word after the last one.
    pub fn new(mut words: Vec<String>, cursor: usize) -> Self {
        let cursor = cursor.min(words.len());
        if cursor == words.len() {
            words.push(String::new());
        }
        Self {
            words,
            cursor,
            index: 1,
            candidates: Vec::new(),
            ignore_case: false,
            loop_depth: 0,
            in_pass: false,
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Execute one pass of `script` over the words up to the cursor.
    pub fn run<F>(&mut self, script: F) -> Result<(), GrammarError>
    where
        F: FnOnce(&mut Engine) -> Step,
    {
        self.index = 1;
        self.candidates.clear();
        if self.cursor == 0 {
            return Ok(());
        }

        self.in_pass = true;
        let outcome = script(self);
        self.in_pass = false;
        self.loop_depth = 0;

        match outcome {
            Ok(()) | Err(Signal::Finish) => Ok(()),
            Err(Signal::Break) => Err(GrammarError::MisplacedSignal {
                primitive: "break",
                context: "a for_arg loop",
            }),
            Err(Signal::Restart) => Err(GrammarError::MisplacedSignal {
                primitive: "restart",
                context: "a for_arg loop",
            }),
            Err(Signal::Fault(err)) => Err(err),
        }
    }

    // --- Accessors ---

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn at_cursor(&self) -> bool {
        self.index == self.cursor
    }

    /// The word under the pointer.
    pub fn word(&self) -> &str {
        self.word_at(self.index).unwrap_or("")
    }

    pub fn cursor_word(&self) -> &str {
        &self.words[self.cursor]
    }

    pub fn word_at(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// Everything registered so far, hidden entries included.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn visible(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| !c.hidden)
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    // --- Candidate primitives ---

    /// Offer `term` if the pointer is on the cursor word; consume nothing.
    pub fn offer<'t>(&mut self, term: impl Into<Term<'t>>) -> Step {
        self.ensure_pass("offer")?;
        if self.at_cursor() {
            self.register(term.into());
        }
        Ok(())
    }

    /// Optional word. Returns whether it was typed and consumed.
    pub fn maybe<'t>(&mut self, term: impl Into<Term<'t>>) -> Step<bool> {
        self.alternative(vec![term.into()], None::<fn(&mut Engine) -> Step>)
    }

    pub fn maybe_then<'t, F>(&mut self, term: impl Into<Term<'t>>, then: F) -> Step<bool>
    where
        F: FnOnce(&mut Engine) -> Step,
    {
        self.alternative(vec![term.into()], Some(then))
    }

    /// Optional run of words, e.g. a flag followed by its argument. Only the
    /// first word decides whether the run applies.
    pub fn maybe_seq<'t>(&mut self, terms: Vec<Term<'t>>) -> Step<bool> {
        self.alternative(terms, None::<fn(&mut Engine) -> Step>)
    }

    pub fn maybe_seq_then<'t, F>(&mut self, terms: Vec<Term<'t>>, then: F) -> Step<bool>
    where
        F: FnOnce(&mut Engine) -> Step,
    {
        self.alternative(terms, Some(then))
    }

    fn alternative<'t, F>(&mut self, terms: Vec<Term<'t>>, then: Option<F>) -> Step<bool>
    where
        F: FnOnce(&mut Engine) -> Step,
    {
        self.ensure_pass("maybe")?;
        let mut terms = terms.into_iter();
        let Some(first) = terms.next() else {
            return Ok(false);
        };

        if self.at_cursor() {
            self.register(first);
            return Ok(false);
        }

        if !first.matches(self.word(), "maybe")? {
            return Ok(false);
        }
        tracing::trace!(index = self.index, word = self.word(), "maybe matched");
        self.advance()?;

        for term in terms {
            if self.at_cursor() {
                self.register(term);
                return Err(Signal::Finish);
            }
            self.advance()?;
        }

        if let Some(then) = then {
            then(self)?;
        }
        Ok(true)
    }

    /// Mandatory word: nothing else can appear here.
    pub fn must<'t>(&mut self, term: impl Into<Term<'t>>) -> Step {
        self.must_seq(vec![term.into()])
    }

    /// Consume one word per term. Reaching the cursor on any of them offers
    /// that term and ends the pass.
    pub fn must_seq<'t>(&mut self, terms: Vec<Term<'t>>) -> Step {
        self.ensure_pass("must")?;
        for term in terms {
            if self.at_cursor() {
                self.register(term);
                return Err(Signal::Finish);
            }
            tracing::trace!(index = self.index, word = self.word(), "must consumed");
            self.advance()?;
        }
        Ok(())
    }

    /// Consume one word without offering anything for it.
    pub fn skip(&mut self) -> Step {
        self.ensure_pass("skip")?;
        if self.at_cursor() {
            return Err(Signal::Finish);
        }
        self.advance()
    }

    // --- Control primitives ---

    /// Run `body` once per remaining word while `guard` (if any) accepts it.
    ///
    /// A rejected word is left for the grammar after the loop. An iteration
    /// that consumes nothing is forced forward one word. At the cursor the
    /// body runs once and the loop exits normally so later grammar can add
    /// its own candidates.
    pub fn for_arg<'t, F>(&mut self, guard: Option<Term<'t>>, mut body: F) -> Step
    where
        F: FnMut(&mut Engine) -> Step,
    {
        self.ensure_pass("for_arg")?;
        self.loop_depth += 1;
        let outcome = self.drive_loop(guard.as_ref(), &mut body);
        self.loop_depth -= 1;
        outcome
    }

    fn drive_loop(
        &mut self,
        guard: Option<&Term<'_>>,
        body: &mut dyn FnMut(&mut Engine) -> Step,
    ) -> Step {
        loop {
            let top = self.index;
            if !self.at_cursor() {
                if let Some(guard) = guard {
                    if !guard.matches(self.word(), "for_arg")? {
                        tracing::trace!(index = self.index, word = self.word(), "loop guard rejected");
                        return Ok(());
                    }
                }
            }

            match body(self) {
                Ok(()) => {}
                Err(Signal::Break) => return Ok(()),
                Err(Signal::Restart) if self.index != top => continue,
                Err(Signal::Restart) => {}
                Err(other) => return Err(other),
            }

            if self.index == top {
                if self.at_cursor() {
                    return Ok(());
                }
                tracing::trace!(index = self.index, word = self.word(), "loop forced forward");
                self.advance()?;
            }
        }
    }

    pub fn brk(&mut self) -> Step {
        self.ensure_loop("break")?;
        Err(Signal::Break)
    }

    pub fn restart(&mut self) -> Step {
        self.ensure_loop("restart")?;
        Err(Signal::Restart)
    }

    pub fn finish(&mut self) -> Step {
        self.ensure_pass("finish")?;
        Err(Signal::Finish)
    }

    // --- Internals ---

    fn ensure_pass(&self, primitive: &'static str) -> Step {
        if self.in_pass {
            Ok(())
        } else {
            Err(GrammarError::MisplacedSignal {
                primitive,
                context: "a completion pass",
            }
            .into())
        }
    }

    fn ensure_loop(&self, primitive: &'static str) -> Step {
        self.ensure_pass(primitive)?;
        if self.loop_depth > 0 {
            Ok(())
        } else {
            Err(GrammarError::MisplacedSignal {
                primitive,
                context: "a for_arg loop",
            }
            .into())
        }
    }

    fn advance(&mut self) -> Step {
        self.index += 1;
        if self.index > self.cursor {
            return Err(Signal::Finish);
        }
        Ok(())
    }

    fn register(&mut self, term: Term<'_>) {
        if !self.at_cursor() {
            return;
        }
        let typed = &self.words[self.cursor];
        for candidate in term.collect() {
            if candidate.is_blank() {
                continue;
            }
            if candidate.forced || prefix_match(&candidate.value, typed, self.ignore_case) {
                self.candidates.push(candidate);
            }
        }
    }
}
