use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::logging::init_tracing;
use crate::output::OutputFormat;

mod check;
mod complete;
pub mod shell;

/// Exit status for a broken grammar: the shell shows no completions.
pub const EXIT_GRAMMAR_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "tabsmith", about = "Declarative tab completion for bash and zsh")]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print completion candidates for the word under the cursor
    Complete {
        /// Grammar file (default: <command>.{yaml,yml,toml} in the grammar dirs)
        #[arg(long)]
        grammar: Option<PathBuf>,

        /// Index of the word being completed (default: the last word)
        #[arg(long, conflicts_with = "line")]
        cursor: Option<usize>,

        /// Raw command line; the cursor is taken to be at its end
        #[arg(long)]
        line: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Match the cursor word case-insensitively
        #[arg(long)]
        ignore_case: bool,

        /// The command line words, as the shell quoted them
        #[arg(last = true)]
        words: Vec<String>,
    },
    /// Load a grammar file and report problems
    Check {
        /// Grammar file to validate
        file: PathBuf,
    },
    /// Print the shell snippet that registers completion for COMMANDS
    Install {
        /// Target shell
        #[arg(long, value_enum, default_value_t)]
        shell: shell::Shell,

        /// Commands to complete through tabsmith
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    init_tracing(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Complete {
            grammar,
            cursor,
            line,
            format,
            ignore_case,
            words,
        } => complete::complete(
            &config,
            complete::Request {
                grammar,
                cursor,
                line,
                format,
                ignore_case,
                words,
            },
        ),
        Commands::Check { file } => Ok(check::check(&file)),
        Commands::Install { shell, commands } => {
            print!("{}", shell::init_code(shell, &commands)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
