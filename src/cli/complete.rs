use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;

use crate::config::Config;
use crate::grammar::{Grammar, Interpreter};
use crate::logging::RequestLogger;
use crate::output::{render, OutputFormat};
use crate::sources::SystemHost;
use crate::tokenizer::{normalize, split_line};

use super::EXIT_GRAMMAR_ERROR;

pub(super) struct Request {
    pub grammar: Option<PathBuf>,
    pub cursor: Option<usize>,
    pub line: Option<String>,
    pub format: OutputFormat,
    pub ignore_case: bool,
    pub words: Vec<String>,
}

pub(super) fn complete(config: &Config, request: Request) -> anyhow::Result<ExitCode> {
    let (words, cursor) = match request.line {
        Some(line) => {
            let words = split_line(&line);
            let cursor = words.len() - 1;
            (words, cursor)
        }
        None => {
            let words = normalize(&request.words);
            let cursor = request.cursor.unwrap_or(words.len().saturating_sub(1));
            if cursor > words.len() {
                anyhow::bail!(
                    "cursor {cursor} is past the end of the command line ({} words)",
                    words.len()
                );
            }
            (words, cursor)
        }
    };

    let command = words.first().map(String::as_str).unwrap_or("");
    let grammar_path = match request.grammar {
        Some(path) => path,
        None => config
            .find_grammar(command)
            .with_context(|| format!("no grammar found for `{command}`"))?,
    };

    let logger = RequestLogger::from_config(&config.logging);
    let host = SystemHost::new(config);
    let ignore_case = request.ignore_case || config.completion.ignore_case;

    let result = Grammar::from_path(&grammar_path).and_then(|grammar| {
        let candidates =
            Interpreter::new(&grammar, &host).complete(words.clone(), cursor, ignore_case)?;
        Ok((grammar.name, candidates))
    });

    match result {
        Ok((name, candidates)) => {
            if let Some(logger) = &logger {
                logger.log_request(Some(&name), &words, cursor, candidates.len(), None);
            }
            let rendered = render(&candidates, request.format, config.completion.max_candidates);
            std::io::stdout()
                .write_all(rendered.as_bytes())
                .context("failed to write candidates")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(grammar = %grammar_path.display(), "grammar error: {err}");
            if let Some(logger) = &logger {
                logger.log_request(None, &words, cursor, 0, Some(err.to_string()));
            }
            eprintln!("tabsmith: {}: {err}", grammar_path.display());
            Ok(ExitCode::from(EXIT_GRAMMAR_ERROR))
        }
    }
}
