//! SOQL literal escaping and query-shape detection.
//!
//! Every piece of free text that ends up inside a quoted SOQL literal must
//! pass through [`quote_literal`]. Templates never concatenate raw input.

/// Escape a value for use inside a single-quoted SOQL string literal.
///
/// Handles the escape sequences SOQL recognises inside string literals:
/// backslash, both quote characters, and the whitespace/control escapes
/// `\n`, `\r`, `\t`, `\b`, `\f`.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{0008}' => escaped.push_str("\\b"),
            '\u{000C}' => escaped.push_str("\\f"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape and wrap a value as a complete SOQL string literal (`'...'`).
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

/// Trim a captured phrase down to the value the user meant.
///
/// Strips surrounding whitespace, trailing sentence punctuation, and one
/// pair of enclosing quotes. Returns `None` when nothing is left.
pub fn clean_phrase(raw: &str) -> Option<String> {
    let mut value = raw.trim().trim_end_matches(['?', '.', '!', ',', ';']).trim();

    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            value = value[1..value.len() - 1].trim();
            break;
        }
    }

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Returns `true` if the input already is a SOQL query.
///
/// The check is a case-insensitive match on the query's two leading
/// keywords: the input must start with `SELECT` and contain a standalone
/// `FROM`.
pub fn looks_like_soql(input: &str) -> bool {
    let mut words = input.split_whitespace();
    let starts_with_select = words
        .next()
        .is_some_and(|w| w.eq_ignore_ascii_case("select"));

    starts_with_select && words.any(|w| w.eq_ignore_ascii_case("from"))
}
