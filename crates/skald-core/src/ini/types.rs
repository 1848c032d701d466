//! In-file representation of the INI format.
//!
//! A document is an ordered list of sections; a section is an ordered
//! list of entries. Entries keep the raw text they were read with and
//! only re-serialize from parsed values once the application reassigned
//! them (explicit `dirty` flag), so untouched entries round-trip
//! byte-for-byte including user formatting.

use crate::config::types::FormatHints;
use crate::ini::escape;
use serde::Serialize;
use tracing::warn;

/// Comment symbols recognized by the format: `#`, `;` and leading `//`.
pub fn starts_with_comment_symbol(text: &str) -> bool {
    text.starts_with('#') || text.starts_with(';') || text.starts_with("//")
}

/// A parse anomaly recorded while reading; never aborts the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// `[Name` without the closing bracket.
    UnterminatedSection,
    /// A line with neither `=` nor whitespace separator.
    MissingAssignment,
}

/// One `name = value` entry of a section.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub name: String,
    /// The unparsed text after the name, as read (starts with the `=`).
    /// Empty for entries created programmatically.
    pub raw_value: String,
    /// Parsed internal values; authoritative once `dirty` is set.
    pub values: Vec<String>,
    pub comments: String,
    pub delim: char,
    pub hints: FormatHints,
    /// Set when the application reassigned the value; selects
    /// re-serialization over raw round-trip.
    pub dirty: bool,
}

impl Entry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delim: ',',
            ..Default::default()
        }
    }

    /// Reassign the parsed values; the entry no longer round-trips its
    /// raw text.
    pub fn set_values(&mut self, values: Vec<String>) {
        self.values = values;
        self.raw_value.clear();
        self.dirty = true;
    }

    /// Parse internal values from the raw INI text: strips the leading
    /// `=`, collapses backslash-newline continuations (quote pairs and
    /// comment runs at join points removed), then splits on the
    /// delimiter.
    pub fn parsed_values(&self, delim: char) -> Vec<String> {
        if self.dirty || self.raw_value.is_empty() {
            return if self.values.is_empty() {
                vec![String::new()]
            } else {
                self.values.clone()
            };
        }

        let mut raw = self.raw_value.trim_start();
        match raw.strip_prefix('=') {
            Some(stripped) => raw = stripped.trim_start(),
            None => {
                warn!(
                    event = "ini.entry.missing_assignment",
                    entry = %self.name,
                    "no equal sign in INI variable"
                );
            }
        }

        let collapsed = collapse_continuations(raw);
        escape::split_values(&collapsed, delim)
    }
}

/// Collapse `\` + newline continuations. Whitespace around each join is
/// trimmed, a `""` pair straddling the join is removed, and joined
/// segments beginning with a comment symbol are dropped entirely.
fn collapse_continuations(raw: &str) -> String {
    let mut parts = raw.split('\n');
    let mut out = parts.next().unwrap_or("").to_string();
    let mut in_comment_run = false;

    for segment in parts {
        if !in_comment_run {
            // strip the continuation marker ending the accumulated text
            let kept = out.trim_end_matches('\r');
            let kept = kept.strip_suffix('\\').unwrap_or(kept);
            let new_len = kept.trim_end().len();
            out.truncate(new_len);
        }

        let mut right = segment.trim_start();
        if !in_comment_run && out.ends_with('"') && right.starts_with('"') {
            out.pop();
            right = &right[1..];
        }

        if starts_with_comment_symbol(right) {
            in_comment_run = true;
            continue;
        }
        in_comment_run = false;
        out.push_str(right.trim_end());
    }
    out
}

/// A named section holding ordered entries. The empty name is the
/// implicit top-level section for entries before the first `[...]`.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub name: String,
    pub comments: String,
    entries: Vec<Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comments: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Find the entry by case-insensitive name, creating it at the end
    /// of the section when absent.
    pub fn entry_mut_or_create(&mut self, name: &str) -> &mut Entry {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
        {
            return &mut self.entries[idx];
        }
        self.entries.push(Entry::new(name));
        self.entries.last_mut().unwrap()
    }

    pub fn remove_entry(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.name.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }
}

/// An INI file's content: file-level comments, ordered sections and the
/// diagnostics collected while reading.
#[derive(Debug, Clone)]
pub struct IniDocument {
    pub file_comments: String,
    sections: Vec<Section>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IniDocument {
    /// An empty document. The implicit top-level section always exists.
    pub fn new() -> Self {
        Self {
            file_comments: String::new(),
            sections: vec![Section::new("")],
            diagnostics: Vec::new(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Find a section by case-insensitive name, creating it at the end
    /// of the document when absent. Comments are only applied to newly
    /// created sections.
    pub fn section_mut_or_create(&mut self, name: &str, comments: &str) -> &mut Section {
        if let Some(idx) = self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            return &mut self.sections[idx];
        }
        let mut section = Section::new(name);
        section.comments = comments.to_string();
        self.sections.push(section);
        self.sections.last_mut().unwrap()
    }

    pub fn entry(&self, section: &str, name: &str) -> Option<&Entry> {
        self.section(section)?.entry(name)
    }

    /// Number of entries over all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}
