//! Variable type definitions for the configuration engine.
//!
//! A configuration variable is addressed by a hierarchical [`VarPath`],
//! carries one or more string values plus the [`Priority`] of the source
//! that defined it, and is parsed into a typed [`VarValue`] according to
//! its declared [`VarKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordinal rank of a configuration source.
///
/// When several plugins define the same variable path, the value of the
/// highest-priority plugin wins. A value defined at `Protected` can never
/// be overwritten by a lower-priority write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// No source defined the variable (declared only).
    #[default]
    None,
    /// Programmatic default values.
    Default,
    /// The application's configuration file (INI).
    File,
    /// Process environment variables.
    Environment,
    /// Command-line arguments.
    Cli,
    /// Protected values; block all lower-priority writes.
    Protected,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Default => "default",
            Priority::File => "file",
            Priority::Environment => "environment",
            Priority::Cli => "cli",
            Priority::Protected => "protected",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic type tag of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Delimiter-separated list of strings.
    StringList,
}

/// Hierarchical variable path.
///
/// Segments are case-insensitive for lookup and case-preserving for
/// display. A path can be written with `/` or `.` separators
/// (`FOO/BAR`, `foo.bar`), or in the flattened `FOO_BAR` spelling used
/// by command-line and environment sources, where the first underscore
/// separates the section from the name.
#[derive(Debug, Clone)]
pub struct VarPath {
    segments: Vec<String>,
}

impl VarPath {
    /// Parse a path from its `/`- or `.`-separated spelling.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split(['/', '.'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Parse a flattened `SECTION_NAME` spelling. The first underscore
    /// splits section from name; without one the whole string is a
    /// top-level name. A leading underscore forces the empty section
    /// (`_HOME_LOCATION` is `HOME_LOCATION` in the top-level section).
    pub fn from_flat(flat: &str) -> Self {
        let flat = flat.trim();
        match flat.find('_') {
            Some(0) => Self {
                segments: vec![flat[1..].to_string()],
            },
            Some(idx) => Self {
                segments: vec![flat[..idx].to_string(), flat[idx + 1..].to_string()],
            },
            None => Self {
                segments: vec![flat.to_string()],
            },
        }
    }

    /// Build a path from a section name and an entry name. An empty
    /// section yields a single-segment path.
    pub fn from_section_name(section: &str, name: &str) -> Self {
        let mut segments = Vec::with_capacity(2);
        if !section.is_empty() {
            segments.push(section.to_string());
        }
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Normalized lookup key: lowercase segments joined with `/`.
    pub fn key(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Flattened spelling: display-case segments joined with `_`.
    pub fn flat(&self) -> String {
        self.segments.join("_")
    }

    /// The final path segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The leading section segment, or `""` for top-level names.
    pub fn section(&self) -> &str {
        if self.segments.len() > 1 {
            &self.segments[0]
        } else {
            ""
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl PartialEq for VarPath {
    fn eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for VarPath {}

impl Hash for VarPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for segment in &self.segments {
            segment.to_lowercase().hash(state);
        }
    }
}

impl Serialize for VarPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Presentation hints carried through INI round trips. Not semantic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatHints {
    /// Write each list value on its own continuation line.
    pub multiline: bool,
    /// Surround the delimiter with spaces in single-line mode.
    pub space_around_delim: bool,
    /// Marker (e.g. `=`) whose column is aligned across multi-line values.
    pub attr_alignment: Option<String>,
}

impl Default for FormatHints {
    fn default() -> Self {
        Self {
            multiline: false,
            space_around_delim: true,
            attr_alignment: None,
        }
    }
}

/// Declaration of a variable: path, expected kind and optional
/// externalized default value, plus presentation metadata.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub path: VarPath,
    pub kind: VarKind,
    pub default: Option<String>,
    pub delim: char,
    pub comments: String,
    pub hints: FormatHints,
}

impl VarDecl {
    pub fn new(path: &str, kind: VarKind) -> Self {
        Self {
            path: VarPath::parse(path),
            kind,
            default: None,
            delim: ',',
            comments: String::new(),
            hints: FormatHints::default(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_delim(mut self, delim: char) -> Self {
        self.delim = delim;
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_hints(mut self, hints: FormatHints) -> Self {
        self.hints = hints;
        self
    }
}

/// A configuration variable: one primary value plus optional additional
/// values for list kinds, tagged with the priority of its source.
#[derive(Debug, Clone)]
pub struct Variable {
    pub path: VarPath,
    pub values: Vec<String>,
    pub priority: Priority,
    pub delim: char,
    pub comments: String,
    pub hints: FormatHints,
}

impl Variable {
    pub fn new(path: VarPath, values: Vec<String>, priority: Priority) -> Self {
        Self {
            path,
            values,
            priority,
            delim: ',',
            comments: String::new(),
            hints: FormatHints::default(),
        }
    }

    /// The primary value, if any value is set.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_defined(&self) -> bool {
        !self.values.is_empty()
    }
}

/// A value parsed according to the declared [`VarKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    Str(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl VarValue {
    /// Parse raw string values into the declared kind.
    ///
    /// Returns `Err` with a description when the raw text does not parse;
    /// the caller degrades to string-as-is (configuration values are
    /// hand-edited and must not crash the host program).
    pub fn parse(
        kind: VarKind,
        values: &[String],
        is_true: impl Fn(&str) -> bool,
    ) -> Result<VarValue, String> {
        let first = values.first().map(String::as_str).unwrap_or("");
        match kind {
            VarKind::String => Ok(VarValue::Str(first.to_string())),
            VarKind::Integer => first
                .trim()
                .parse::<i64>()
                .map(VarValue::Integer)
                .map_err(|e| format!("'{first}' is not an integer: {e}")),
            VarKind::Float => first
                .trim()
                .parse::<f64>()
                .map(VarValue::Float)
                .map_err(|e| format!("'{first}' is not a number: {e}")),
            VarKind::Boolean => Ok(VarValue::Boolean(is_true(first.trim()))),
            VarKind::StringList => Ok(VarValue::List(values.to_vec())),
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Str(s) => write!(f, "{s}"),
            VarValue::Integer(i) => write!(f, "{i}"),
            VarValue::Float(x) => write!(f, "{x}"),
            VarValue::Boolean(b) => write!(f, "{b}"),
            VarValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::None < Priority::Default);
        assert!(Priority::Default < Priority::File);
        assert!(Priority::File < Priority::Environment);
        assert!(Priority::Environment < Priority::Cli);
        assert!(Priority::Cli < Priority::Protected);
    }

    #[test]
    fn test_path_parse_separators() {
        assert_eq!(VarPath::parse("FOO/BAR"), VarPath::parse("foo.bar"));
        assert_eq!(VarPath::parse("FOO/BAR").key(), "foo/bar");
        assert_eq!(VarPath::parse("FOO/BAR").to_string(), "FOO/BAR");
    }

    #[test]
    fn test_path_from_flat() {
        let path = VarPath::from_flat("FOO_BAR");
        assert_eq!(path.section(), "FOO");
        assert_eq!(path.name(), "BAR");
        assert_eq!(path, VarPath::parse("foo/bar"));
    }

    #[test]
    fn test_path_from_flat_leading_underscore() {
        // A leading underscore addresses a top-level name containing
        // underscores.
        let path = VarPath::from_flat("_HOME_LOCATION");
        assert_eq!(path.section(), "");
        assert_eq!(path.name(), "HOME_LOCATION");
    }

    #[test]
    fn test_path_flat_roundtrip() {
        let path = VarPath::parse("Log/Verbosity");
        assert_eq!(path.flat(), "Log_Verbosity");
    }

    #[test]
    fn test_path_case_insensitive_eq() {
        assert_eq!(VarPath::parse("Foo/Bar"), VarPath::parse("FOO/bar"));
    }

    #[test]
    fn test_parse_integer() {
        let values = vec!["42".to_string()];
        let parsed = VarValue::parse(VarKind::Integer, &values, |_| false).unwrap();
        assert_eq!(parsed, VarValue::Integer(42));
    }

    #[test]
    fn test_parse_integer_failure() {
        let values = vec!["not a number".to_string()];
        assert!(VarValue::parse(VarKind::Integer, &values, |_| false).is_err());
    }

    #[test]
    fn test_parse_boolean_uses_predicate() {
        let values = vec!["yes".to_string()];
        let parsed =
            VarValue::parse(VarKind::Boolean, &values, |s| s.eq_ignore_ascii_case("yes")).unwrap();
        assert_eq!(parsed, VarValue::Boolean(true));
    }
}
