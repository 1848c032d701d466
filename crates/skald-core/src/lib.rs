//! skald-core: Layered configuration and console log formatting
//!
//! This library provides two independent subsystems:
//!
//! - A layered configuration engine: variables are resolved across an
//!   ordered list of prioritized plugins (in-memory defaults, INI file,
//!   environment, command line, protected values), with `${NAME}`-style
//!   substitution, multi-value lists, and round-trip persistence to an
//!   INI-like text format.
//! - A text-log formatting engine: an interpreter for an internal
//!   escape-sequence alphabet that tracks the output column, computes
//!   adaptive auto-tab stops, and translates or prunes color and style
//!   codes per output sink (ANSI console, in-memory buffer).
//!
//! # Main Entry Points
//!
//! - [`config`] - Declare, load, store and watch configuration variables
//! - [`ini`] - Parse and serialize the INI-like persistence format
//! - [`fmt`] - Escape-code interpretation, auto-tab sizing, loggers

pub mod config;
pub mod errors;
pub mod fmt;
pub mod ini;
pub mod logging;

// Re-export commonly used types at crate root for convenience
pub use config::configuration::{ConfigEvent, Configuration, ListenerFilter};
pub use config::plugins::{
    CliArgsPlugin, ConfigPlugin, CustomPlugin, EnvironmentPlugin, InMemoryPlugin, PluginHit,
};
pub use config::store::VariableStore;
pub use config::types::{Priority, VarDecl, VarKind, VarPath, VarValue, Variable};
pub use fmt::ansi::{AnsiLogger, LightColorUsage};
pub use fmt::autosizes::AutoSizes;
pub use fmt::interpreter::{ControlCode, EscapeInterpreter, Sink};
pub use fmt::memory::MemoryLogger;
pub use ini::plugin::IniFilePlugin;
pub use ini::types::IniDocument;

// Re-export logging initialization
pub use logging::init_logging;
