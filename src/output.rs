use std::borrow::Cow;

use clap::ValueEnum;

use crate::candidate::Candidate;

/// How candidates are handed back to the invoking shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One shell-ready word per line (bash `COMPREPLY`).
    #[default]
    Plain,
    /// `word<TAB>help` per line, for describing completers.
    Tsv,
    /// JSON array of candidate objects.
    Json,
}

/// Replace tabs and newlines so one candidate stays on one line.
fn sanitize_tsv(s: &str) -> Cow<'_, str> {
    if s.contains(['\t', '\n', '\r']) {
        Cow::Owned(s.replace('\t', "    ").replace('\n', " ").replace('\r', ""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Render the visible candidates, keeping at most `max` (0 = all).
pub fn render(candidates: &[Candidate], format: OutputFormat, max: usize) -> String {
    let limit = if max == 0 { usize::MAX } else { max };
    let visible: Vec<&Candidate> = candidates.iter().filter(|c| !c.hidden).take(limit).collect();

    match format {
        OutputFormat::Plain => visible
            .iter()
            .map(|c| format!("{}\n", sanitize_tsv(&c.formatted())))
            .collect(),
        OutputFormat::Tsv => visible
            .iter()
            .map(|c| {
                let mut line = sanitize_tsv(&c.formatted()).into_owned();
                if !c.help.is_empty() {
                    line.push('\t');
                    line.push_str(&sanitize_tsv(&c.help));
                }
                line.push('\n');
                line
            })
            .collect(),
        OutputFormat::Json => match serde_json::to_string(&visible) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                tracing::warn!("Failed to serialize candidates: {e}");
                "[]\n".to_string()
            }
        },
    }
}
