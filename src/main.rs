use std::process::ExitCode;

fn main() -> ExitCode {
    match tabsmith::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tabsmith: {e:#}");
            ExitCode::FAILURE
        }
    }
}
