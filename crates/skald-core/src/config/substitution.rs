//! Placeholder substitution inside raw variable values.
//!
//! A raw value may reference other variables (`$NAME`, `${NAME}`); the
//! reference is replaced with the referenced variable's primary value
//! before type parsing. Replaced text is re-scanned, so nested
//! references resolve too. A fixed replacement ceiling guards against
//! self-referential definitions: hitting it is not fatal, the
//! best-effort string is returned and a warning event is emitted.

use crate::config::types::VarPath;
use tracing::warn;

/// Placeholder syntax and expansion limits.
#[derive(Debug, Clone)]
pub struct SubstitutionOptions {
    /// Start marker of a placeholder.
    pub start: String,
    /// End marker. Empty means the placeholder name ends at the first
    /// non-identifier character.
    pub end: String,
    /// Maximum number of replacements performed per value.
    pub max_replacements: usize,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            start: "$".to_string(),
            end: String::new(),
            max_replacements: 50,
        }
    }
}

impl SubstitutionOptions {
    /// The bracketed `${NAME}` syntax.
    pub fn bracketed() -> Self {
        Self {
            start: "${".to_string(),
            end: "}".to_string(),
            max_replacements: 50,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expand placeholders in `raw`, resolving names through `lookup`.
///
/// Names are tried in their flattened `SECTION_NAME` reading first and
/// as a plain top-level name second, both case-insensitive. An unknown
/// placeholder expands to the empty string.
pub fn expand(
    raw: &str,
    options: &SubstitutionOptions,
    lookup: &dyn Fn(&VarPath) -> Option<String>,
) -> String {
    let mut value = raw.to_string();
    let mut search_start = 0usize;
    let mut remaining = options.max_replacements;

    loop {
        if remaining == 0 {
            warn!(
                event = "config.substitution.depth_exceeded",
                value = raw,
                limit = options.max_replacements,
                "too many substitutions, probably a recursive variable definition"
            );
            break;
        }
        remaining -= 1;

        let Some(found) = value[search_start..].find(&options.start) else {
            break;
        };
        let rep_start = search_start + found;
        let var_start = rep_start + options.start.len();

        let (name_end, rep_end) = if options.end.is_empty() {
            let end = value[var_start..]
                .char_indices()
                .find(|(_, c)| !is_ident_char(*c))
                .map(|(i, _)| var_start + i)
                .unwrap_or(value.len());
            (end, end)
        } else {
            match value[var_start..].find(&options.end) {
                Some(i) => (var_start + i, var_start + i + options.end.len()),
                None => {
                    warn!(
                        event = "config.substitution.unterminated",
                        value = raw,
                        "end of substitution variable not found while start was found"
                    );
                    break;
                }
            }
        };

        let name = value[var_start..name_end].to_string();
        if name.is_empty() {
            // Nothing to resolve; step past the markers and keep scanning.
            search_start = rep_end.max(rep_start + options.start.len());
            continue;
        }

        let replacement = resolve(&name, lookup).unwrap_or_default();
        value.replace_range(rep_start..rep_end, &replacement);

        // Rescan from the replacement start so nested placeholders expand.
        search_start = rep_start;
    }

    value
}

fn resolve(name: &str, lookup: &dyn Fn(&VarPath) -> Option<String>) -> Option<String> {
    let flattened = VarPath::from_flat(name);
    if let Some(value) = lookup(&flattened) {
        return Some(value);
    }
    if name.contains('_') {
        // Tolerate top-level names that themselves contain underscores.
        let plain = VarPath::from_section_name("", name);
        return lookup(&plain);
    }
    None
}
