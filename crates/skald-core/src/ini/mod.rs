//! # INI Persistence Format
//!
//! A hand-rolled line-oriented format for configuration round trips:
//!
//! ```ini
//! # comment
//! ; comment
//! // comment
//! [SectionName]
//! Name = value
//! MultiName = v1, v2, v3
//! Continued = firstpart\
//!            secondpart
//! ```
//!
//! Comment blocks attach to the construct that follows them, trailing
//! unescaped backslashes continue a value on the next line, and entries
//! that were never reassigned by the application round-trip their raw
//! text byte-for-byte.

pub mod errors;
pub mod escape;
pub mod plugin;
pub mod reader;
pub mod types;
pub mod writer;

// Public API exports
pub use errors::IniError;
pub use plugin::IniFilePlugin;
pub use reader::{parse_str, read_document};
pub use types::{Diagnostic, DiagnosticKind, Entry, IniDocument, Section};
pub use writer::{WriterOptions, to_string, write_document};
