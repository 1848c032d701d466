//! Externalized value grammar shared by all plugins.
//!
//! Values provided via command line, environment or INI files are
//! "externalized": special characters are backslash-escaped, values
//! with leading/trailing blanks or embedded delimiters are quoted, and
//! multiple values are joined with a delimiter character. This module
//! converts between that representation and internal value strings.

/// Convert one externalized token to its internal form: trims, strips a
/// surrounding quote pair and resolves backslash escapes.
pub fn internalize(src: &str) -> String {
    let mut src = src.trim();
    if src.len() >= 2 && src.starts_with('"') && src.ends_with('"') {
        src = &src[1..src.len() - 1];
    }

    let mut dest = String::with_capacity(src.len());
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            dest.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => dest.push('\\'),
            Some('"') => dest.push('"'),
            Some('n') => dest.push('\n'),
            Some('r') => dest.push('\r'),
            Some('t') => dest.push('\t'),
            Some('a') => dest.push('\x07'),
            Some('b') => dest.push('\x08'),
            Some('v') => dest.push('\x0b'),
            Some('f') => dest.push('\x0c'),
            Some('e') => dest.push('\x1b'),
            Some(other) => dest.push(other),
            None => {}
        }
    }
    dest
}

/// Convert an internal value to its externalized form, quoting when the
/// value starts or ends with a blank or contains the delimiter.
pub fn externalize(src: &str, delim: char) -> String {
    let needs_quotes = src.starts_with(' ')
        || src.starts_with('\t')
        || src.ends_with(' ')
        || src.ends_with('\t')
        || src.contains(delim);

    let mut dest = String::with_capacity(src.len() + 2);
    if needs_quotes {
        dest.push('"');
    }
    for c in src.chars() {
        match c {
            '"' => dest.push_str(if needs_quotes { "\\\"" } else { "\"" }),
            '\\' => dest.push_str("\\\\"),
            '\r' => dest.push_str("\\r"),
            '\n' => dest.push_str("\\n"),
            '\t' => dest.push_str("\\t"),
            '\x07' => dest.push_str("\\a"),
            '\x08' => dest.push_str("\\b"),
            '\x0b' => dest.push_str("\\v"),
            '\x0c' => dest.push_str("\\f"),
            '\x1b' => dest.push_str("\\e"),
            other => dest.push(other),
        }
    }
    if needs_quotes {
        dest.push('"');
    }
    dest
}

/// Split an externalized string into internal values.
///
/// The split is quote- and escape-aware: delimiters inside quotes or
/// after a backslash do not separate values. The result always contains
/// at least one (possibly empty) value — "defined but empty" is
/// distinct from "not defined".
pub fn split_values(raw: &str, delim: char) -> Vec<String> {
    let mut values = Vec::new();
    let mut in_quote = false;
    let mut last_was_backslash = false;
    let mut token_start = 0usize;

    for (idx, c) in raw.char_indices() {
        if last_was_backslash {
            last_was_backslash = false;
            continue;
        }
        match c {
            '\\' => last_was_backslash = true,
            '"' => in_quote = !in_quote,
            c if c == delim && !in_quote => {
                values.push(internalize(&raw[token_start..idx]));
                token_start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    values.push(internalize(&raw[token_start..]));
    values
}

/// Join internal values into one externalized line.
pub fn join_values(values: &[String], delim: char, space_before: bool, space_after: bool) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            if space_before {
                out.push(' ');
            }
            out.push(delim);
            if space_after {
                out.push(' ');
            }
        }
        out.push_str(&externalize(value, delim));
    }
    out
}
