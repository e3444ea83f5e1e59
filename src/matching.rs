use regex::Regex;

/// True when `text` starts with `typed`, optionally ignoring case.
pub fn prefix_match(text: &str, typed: &str, ignore_case: bool) -> bool {
    if ignore_case {
        text.to_lowercase().starts_with(&typed.to_lowercase())
    } else {
        text.starts_with(typed)
    }
}

/// Words that steer branch selection always compare case-sensitively.
pub fn exact_match(expected: &str, word: &str) -> bool {
    expected == word
}

pub fn set_match<S: AsRef<str>>(members: &[S], word: &str) -> bool {
    members.iter().any(|m| exact_match(m.as_ref(), word))
}

pub fn pattern_match(pattern: &Regex, word: &str) -> bool {
    pattern.is_match(word)
}
