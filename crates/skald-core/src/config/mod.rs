//! # Layered Configuration Engine
//!
//! Variables are resolved across an ordered list of prioritized
//! plugins. Reads walk the chain in descending priority and the first
//! plugin that defines a variable wins; writes target exactly the
//! plugin registered at the requested priority.
//!
//! ## Priority chain
//!
//! `none < default < file < environment < cli < protected`
//!
//! A value held at `protected` priority can never be overwritten by a
//! lower-priority write, which allows embedding code to pin variables
//! against external modification.
//!
//! ## Usage Example
//!
//! ```rust
//! use skald_core::config::configuration::Configuration;
//! use skald_core::config::types::{Priority, VarDecl, VarKind};
//!
//! let config = Configuration::with_default_plugins(["--APP_PORT=9000".to_string()]);
//! config.declare(VarDecl::new("APP/PORT", VarKind::Integer).with_default("8080"));
//!
//! let port = config.load(&VarDecl::new("APP/PORT", VarKind::Integer).with_default("8080"));
//! assert_eq!(port.priority(), Priority::Cli);
//! ```

pub mod configuration;
pub mod plugins;
pub mod store;
pub mod substitution;
pub mod types;

// Public API exports
pub use configuration::{
    ConfigEvent, Configuration, ListenerFilter, ListenerId, ResolvedVariable, StoreOutcome,
};
pub use plugins::{CliArgsPlugin, ConfigPlugin, CustomPlugin, EnvironmentPlugin, InMemoryPlugin};
pub use store::{RemoveOutcome, UpsertOutcome, VariableStore};
pub use substitution::SubstitutionOptions;
pub use types::{FormatHints, Priority, VarDecl, VarKind, VarPath, VarValue, Variable};
