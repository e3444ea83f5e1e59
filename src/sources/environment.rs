use crate::candidate::Candidate;

use super::Host;

/// Variable completion for a word starting with `$`.
///
/// Names come back as raw `$NAME` candidates. When the word already names a
/// set variable, its expansion is offered too, forced past the prefix filter
/// since it no longer starts with `$`.
pub fn env_candidates(host: &dyn Host, typed: &str) -> Vec<Candidate> {
    let Some(name) = typed.strip_prefix('$') else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if !name.is_empty() {
        if let Some(value) = host.env_var(name) {
            out.push(Candidate::new(typed).raw().hidden());
            out.push(Candidate::partial(value).forced().with_help(typed));
        }
    }

    out.extend(
        host.env_var_names()
            .into_iter()
            .filter(|n| n.as_str() != name)
            .map(|n| Candidate::new(format!("${n}")).raw()),
    );
    out
}
