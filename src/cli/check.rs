use std::path::Path;
use std::process::ExitCode;

use crate::grammar::Grammar;

use super::EXIT_GRAMMAR_ERROR;

pub(super) fn check(file: &Path) -> ExitCode {
    match Grammar::from_path(file) {
        Ok(grammar) => {
            let mut subs: Vec<&str> = grammar.sub_grammar_names().collect();
            subs.sort_unstable();
            let name = if grammar.name.is_empty() {
                "<unnamed>"
            } else {
                grammar.name.as_str()
            };
            if subs.is_empty() {
                println!("{}: ok ({name})", file.display());
            } else {
                println!("{}: ok ({name}; sub-grammars: {})", file.display(), subs.join(", "));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("tabsmith: {err}");
            ExitCode::from(EXIT_GRAMMAR_ERROR)
        }
    }
}
