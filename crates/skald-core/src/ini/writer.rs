//! INI serialization.
//!
//! Entries whose parsed value was never reassigned round-trip their raw
//! text byte-for-byte; dirty entries re-serialize from typed values,
//! either on a single line (delimiter-joined) or across continuation
//! lines. Assignments within a section align on a shared column.

use crate::ini::errors::IniError;
use crate::ini::types::{Entry, IniDocument, Section, starts_with_comment_symbol};
use std::path::Path;
use tracing::debug;

/// Serialization options, applied file-wide.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Prefix inserted before comment lines that do not already start
    /// with a comment symbol.
    pub comment_prefix: String,
    /// Emit a space before the delimiter in single-line mode.
    pub space_before_delim: bool,
    /// Emit a space after the delimiter in single-line mode.
    pub space_after_delim: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            comment_prefix: "# ".to_string(),
            space_before_delim: false,
            space_after_delim: true,
        }
    }
}

/// Serialize the document and write it to `path`.
pub fn write_document(doc: &IniDocument, path: &Path) -> Result<(), IniError> {
    write_document_with(doc, path, &WriterOptions::default())
}

pub fn write_document_with(
    doc: &IniDocument,
    path: &Path,
    options: &WriterOptions,
) -> Result<(), IniError> {
    let content = to_string_with(doc, options);
    std::fs::write(path, content).map_err(|source| IniError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        event = "ini.file.write_completed",
        path = %path.display(),
        entries = doc.entry_count(),
    );
    Ok(())
}

/// Serialize the document with default options.
pub fn to_string(doc: &IniDocument) -> String {
    to_string_with(doc, &WriterOptions::default())
}

pub fn to_string_with(doc: &IniDocument, options: &WriterOptions) -> String {
    let mut out = String::new();

    if !doc.file_comments.trim().is_empty() {
        write_comments(&mut out, &doc.file_comments, options);
        out.push('\n');
    }

    let mut entries_written = 0usize;
    for section in doc.sections() {
        write_section(&mut out, section, &mut entries_written, options);
    }
    out
}

fn write_section(
    out: &mut String,
    section: &Section,
    entries_written: &mut usize,
    options: &WriterOptions,
) {
    if section.entries().is_empty() && section.comments.trim().is_empty() {
        return;
    }

    // blank separator between sections
    if *entries_written > 0 {
        out.push('\n');
    }
    write_comments(out, &section.comments, options);
    if !section.name.is_empty() {
        out.push('[');
        out.push_str(&section.name);
        out.push_str("]\n");
    }

    let max_name_len = section
        .entries()
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0);

    let mut previous_had_comments = true;
    for entry in section.entries() {
        *entries_written += 1;

        let has_comments = !entry.comments.trim().is_empty();
        if has_comments {
            // an extra separator when the previous entry was bare
            if !previous_had_comments {
                out.push('\n');
            }
            write_comments(out, &entry.comments, options);
        }

        out.push_str(&entry.name);
        if !entry.dirty && !entry.raw_value.is_empty() {
            // untouched entry: reproduce the user's own formatting
            out.push_str(&entry.raw_value);
        } else {
            out.push('=');
            push_spaces(out, max_name_len - entry.name.len() + 1);
            if entry.hints.multiline {
                write_multi_line(out, entry, max_name_len);
            } else {
                write_single_line(out, entry, options);
            }
        }
        out.push('\n');

        previous_had_comments = has_comments;
        if has_comments {
            out.push('\n');
        }
    }
}

fn write_single_line(out: &mut String, entry: &Entry, options: &WriterOptions) {
    let spaces = entry.hints.space_around_delim;
    let joined = crate::ini::escape::join_values(
        &entry.values,
        entry.delim,
        spaces && options.space_before_delim,
        spaces && options.space_after_delim,
    );
    out.push_str(&joined);
}

/// Index of an attribute-assignment marker usable for alignment: it
/// must not be at the start and must come before any quote.
fn assignment_pos(value: &str, marker: &str) -> Option<usize> {
    let idx = value.find(marker)?;
    if idx == 0 {
        return None;
    }
    let quote = value.find('"').unwrap_or(value.len());
    (quote > idx).then_some(idx)
}

fn write_multi_line(out: &mut String, entry: &Entry, max_name_len: usize) {
    let mut backslash_pos = 0usize;
    let mut last_line_len = 0usize;

    // widest attribute-assignment column across the values
    let mut max_attr_pos = 0usize;
    if let Some(marker) = &entry.hints.attr_alignment {
        let mut all_have_preceding_blank = true;
        for value in &entry.values {
            if let Some(pos) = assignment_pos(value, marker) {
                max_attr_pos = max_attr_pos.max(pos);
                all_have_preceding_blank &= value[..pos].ends_with(' ');
            }
        }
        if max_attr_pos > 0 && !all_have_preceding_blank {
            max_attr_pos += 1;
        }
    }

    for (i, value) in entry.values.iter().enumerate() {
        if i > 0 {
            out.push(entry.delim);
            last_line_len += 1;
            if backslash_pos < last_line_len + 1 {
                backslash_pos = last_line_len + 4;
            }
            push_spaces(out, backslash_pos - last_line_len);
            out.push_str("\\\n");
            // align under the "name= " prefix
            push_spaces(out, max_name_len + 2);
        }

        let mut externalized = crate::ini::escape::externalize(value, entry.delim);
        // a continued value must not be mistaken for a comment line
        if i > 0 && (externalized.starts_with('#') || externalized.starts_with(';')) {
            externalized.insert(0, '\\');
        }

        if let Some(marker) = &entry.hints.attr_alignment
            && let Some(pos) = assignment_pos(&externalized, marker)
            && pos < max_attr_pos
        {
            let insert_at = pos + marker.len();
            let padding = " ".repeat(max_attr_pos - pos);
            externalized.insert_str(insert_at, &padding);
        }

        out.push_str(&externalized);
        last_line_len = max_name_len + 2 + externalized.len();
    }
}

fn write_comments(out: &mut String, comments: &str, options: &WriterOptions) {
    if comments.trim().is_empty() {
        return;
    }
    for line in comments.split('\n') {
        let line = line.trim_matches([' ', '\r', '\t']);
        if !starts_with_comment_symbol(line) {
            out.push_str(&options.comment_prefix);
        }
        out.push_str(line);
        out.push('\n');
    }
}

fn push_spaces(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::FormatHints;
    use crate::ini::reader::parse_str;

    fn doc_with_entry(name: &str, values: &[&str], hints: FormatHints) -> IniDocument {
        let mut doc = IniDocument::new();
        let section = doc.section_mut_or_create("", "");
        let entry = section.entry_mut_or_create(name);
        entry.set_values(values.iter().map(|s| s.to_string()).collect());
        entry.hints = hints;
        doc
    }

    #[test]
    fn test_raw_roundtrip_unmodified() {
        let content = "Name= value\nOther=x\n";
        let doc = parse_str(content);
        assert_eq!(to_string(&doc), content);
    }

    #[test]
    fn test_roundtrip_with_sections_and_comments() {
        let content = "# header comment\n\n[Section]\nName= v1, v2\n";
        let doc = parse_str(content);
        assert_eq!(to_string(&doc), content);
    }

    #[test]
    fn test_roundtrip_idempotent() {
        let content = "# file\n\n[A]\nx= 1\ny= 2\n\n[B]\nlong_name= 3\n";
        let once = to_string(&parse_str(content));
        let twice = to_string(&parse_str(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dirty_entry_reserialized_aligned() {
        let mut doc = IniDocument::new();
        let section = doc.section_mut_or_create("", "");
        section
            .entry_mut_or_create("a")
            .set_values(vec!["1".to_string()]);
        section
            .entry_mut_or_create("longer")
            .set_values(vec!["2".to_string()]);
        let text = to_string(&doc);
        // assignment columns align on the longest entry name
        assert_eq!(text, "a=      1\nlonger= 2\n");
    }

    #[test]
    fn test_single_line_list() {
        let doc = doc_with_entry("list", &["a", "b", "c"], FormatHints::default());
        assert_eq!(to_string(&doc), "list= a, b, c\n");
    }

    #[test]
    fn test_single_line_no_delim_spaces() {
        let hints = FormatHints {
            space_around_delim: false,
            ..FormatHints::default()
        };
        let doc = doc_with_entry("list", &["a", "b"], hints);
        assert_eq!(to_string(&doc), "list= a,b\n");
    }

    #[test]
    fn test_multi_line_continuations() {
        let hints = FormatHints {
            multiline: true,
            ..FormatHints::default()
        };
        let doc = doc_with_entry("m", &["v1", "v2", "v3"], hints);
        let text = to_string(&doc);
        // every line but the last carries the delimiter + continuation
        assert_eq!(text.matches("\\\n").count(), 2);
        let reparsed = parse_str(&text);
        assert_eq!(
            reparsed.entry("", "m").unwrap().parsed_values(','),
            vec!["v1", "v2", "v3"]
        );
    }

    #[test]
    fn test_multi_line_comment_lookalike_escaped() {
        let hints = FormatHints {
            multiline: true,
            ..FormatHints::default()
        };
        let doc = doc_with_entry("m", &["plain", "#looks-like-comment"], hints);
        let text = to_string(&doc);
        let reparsed = parse_str(&text);
        assert_eq!(
            reparsed.entry("", "m").unwrap().parsed_values(','),
            vec!["plain", "#looks-like-comment"]
        );
    }

    #[test]
    fn test_multi_line_attr_alignment() {
        let hints = FormatHints {
            multiline: true,
            attr_alignment: Some("=".to_string()),
            ..FormatHints::default()
        };
        let doc = doc_with_entry("m", &["alpha=1", "l=2"], hints);
        let text = to_string(&doc);
        // the text after the shorter attribute's '=' is padded to the
        // widest assignment column
        assert!(text.contains("l=     2"), "got: {text}");
    }

    #[test]
    fn test_comment_prefix_inserted() {
        let mut doc = IniDocument::new();
        let section = doc.section_mut_or_create("", "");
        let entry = section.entry_mut_or_create("k");
        entry.set_values(vec!["v".to_string()]);
        entry.comments = "plain note".to_string();
        let text = to_string(&doc);
        assert!(text.contains("# plain note\n"), "got: {text}");
    }

    #[test]
    fn test_blank_line_after_commented_entry() {
        let mut doc = IniDocument::new();
        let section = doc.section_mut_or_create("", "");
        let first = section.entry_mut_or_create("first");
        first.set_values(vec!["1".to_string()]);
        first.comments = "# about first".to_string();
        let second = section.entry_mut_or_create("second");
        second.set_values(vec!["2".to_string()]);
        let text = to_string(&doc);
        assert_eq!(text, "# about first\nfirst=  1\n\nsecond= 2\n");
    }

    #[test]
    fn test_write_document_io_error() {
        let doc = IniDocument::new();
        let err = write_document(&doc, Path::new("/nonexistent-dir/x/app.ini")).unwrap_err();
        assert!(err.to_string().contains("app.ini"));
    }
}
