//! Line-oriented single-pass INI reading.
//!
//! Comment blocks accumulate onto the next construct, `[Section]` lines
//! switch the current section, and entry lines split at the first
//! unescaped `=` or whitespace. A raw value line ending in an unescaped
//! backslash pulls in the next physical line. Parse anomalies are
//! recorded as per-line diagnostics; reading never aborts.

use crate::ini::errors::IniError;
use crate::ini::types::{Diagnostic, DiagnosticKind, IniDocument, starts_with_comment_symbol};
use std::path::Path;
use tracing::debug;

/// Read a document from a file. A missing file is not an error and
/// yields an empty document; any other I/O failure is reported with the
/// path and OS error.
pub fn read_document(path: &Path) -> Result<IniDocument, IniError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(event = "ini.file.not_found", path = %path.display());
            return Ok(IniDocument::new());
        }
        Err(source) => {
            return Err(IniError::ReadFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let doc = parse_str(&content);
    debug!(
        event = "ini.file.read_completed",
        path = %path.display(),
        entries = doc.entry_count(),
        diagnostics = doc.diagnostics.len(),
    );
    Ok(doc)
}

/// Position of the first unescaped `=` or whitespace character.
fn separator_index(line: &str) -> Option<usize> {
    let mut last_was_backslash = false;
    for (idx, c) in line.char_indices() {
        if last_was_backslash {
            last_was_backslash = false;
            continue;
        }
        if c == '\\' {
            last_was_backslash = true;
            continue;
        }
        if c == '=' || c.is_whitespace() {
            return Some(idx);
        }
    }
    None
}

fn ends_with_unescaped_backslash(text: &str) -> bool {
    let mut trailing = 0usize;
    for c in text.chars().rev() {
        if c == '\\' {
            trailing += 1;
        } else {
            break;
        }
    }
    trailing % 2 == 1
}

/// Parse INI text into a document.
pub fn parse_str(content: &str) -> IniDocument {
    let mut doc = IniDocument::new();
    let mut comments = String::new();
    let mut current_section = String::new();
    let mut file_header_read = false;
    let mut line_no = 0usize;

    let mut lines = content.lines();
    while let Some(physical) = lines.next() {
        line_no += 1;
        let line = physical.trim();

        if starts_with_comment_symbol(line) {
            if !comments.is_empty() {
                comments.push('\n');
            }
            comments.push_str(line);
            continue;
        }

        // comments before the first construct belong to the file header
        if !file_header_read {
            file_header_read = true;
            doc.file_comments = std::mem::take(&mut comments);
        }

        if line.is_empty() {
            if !comments.is_empty() {
                comments.push('\n');
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = match rest.strip_suffix(']') {
                Some(name) => name,
                None => {
                    // missing closing bracket: recorded, line still used
                    doc.diagnostics.push(Diagnostic {
                        line: line_no,
                        kind: DiagnosticKind::UnterminatedSection,
                    });
                    rest
                }
            };
            doc.section_mut_or_create(name.trim(), &comments);
            current_section = name.trim().to_string();
            comments.clear();
            continue;
        }

        // entry line
        let (name, mut raw_value) = match separator_index(line) {
            Some(idx) => (line[..idx].to_string(), line[idx..].to_string()),
            None => {
                doc.diagnostics.push(Diagnostic {
                    line: line_no,
                    kind: DiagnosticKind::MissingAssignment,
                });
                (line.to_string(), String::new())
            }
        };

        // continuation: unescaped trailing backslash pulls the next line
        let mut tail = raw_value.clone();
        while ends_with_unescaped_backslash(&tail) {
            match lines.next() {
                Some(next_physical) => {
                    line_no += 1;
                    let next_line = next_physical.trim_end();
                    raw_value.push('\n');
                    raw_value.push_str(next_line);
                    tail = next_line.to_string();
                }
                // continuation at end of file simply stops
                None => break,
            }
        }

        let section = doc.section_mut_or_create(&current_section, "");
        let entry = section.entry_mut_or_create(&name);
        // duplicate (section, name): last wins
        entry.values.clear();
        entry.dirty = false;
        entry.comments = std::mem::take(&mut comments);
        entry.raw_value = raw_value;
    }

    doc
}
