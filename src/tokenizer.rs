/// Turn one shell-quoted token into its logical value.
///
/// Single quotes are literal, backslash escapes the next character both
/// inside double quotes and outside of quotes. Unterminated quotes and a
/// trailing backslash are kept as literal text, so this never fails.
pub fn unescape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escaped = false;

    for ch in token.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' if !in_single_quote => escaped = true,
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            _ => out.push(ch),
        }
    }

    if escaped {
        out.push('\\');
    }

    out
}

fn is_safe_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | ':' | '+' | '@' | '-')
}

/// Quote a value so the shell reads it back as exactly one word.
pub fn escape(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Unescape every raw word handed over by the shell.
pub fn normalize<S: AsRef<str>>(raw_words: &[S]) -> Vec<String> {
    raw_words.iter().map(|w| unescape(w.as_ref())).collect()
}

/// Split a raw command line into logical words, respecting quotes.
///
/// A line ending in unquoted whitespace yields a trailing empty word: the
/// cursor sits on a fresh word that has not been typed yet.
pub fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut has_word = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' if !in_single_quote => {
                escaped = true;
                has_word = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                has_word = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                has_word = true;
            }
            ' ' | '\t' | '\n' if !in_single_quote && !in_double_quote => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            _ => {
                current.push(ch);
                has_word = true;
            }
        }
    }

    if escaped {
        current.push('\\');
    }

    let ends_blank = line.ends_with([' ', '\t', '\n']) && !in_single_quote && !in_double_quote;
    if has_word {
        words.push(current);
    }
    if ends_blank || words.is_empty() {
        words.push(String::new());
    }

    words
}
