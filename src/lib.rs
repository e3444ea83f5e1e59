pub mod candidate;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod matching;
pub mod output;
pub mod sources;
pub mod tokenizer;

pub use candidate::Candidate;
pub use engine::{Engine, Signal, Step, Term};
pub use error::GrammarError;
pub use grammar::{Grammar, Interpreter};
pub use sources::{Host, SystemHost};
