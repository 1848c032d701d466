//! # Text-Log Formatting Engine
//!
//! Messages carry a portable escape alphabet ([`esc`]) instead of raw
//! terminal sequences. The [`interpreter`] scans a message, tracks the
//! output column, pads to adaptive auto-tab stops ([`autosizes`]) and
//! hands literal runs plus control actions to a sink: the ANSI sink
//! translates codes through a fixed color table ([`ansi`]), the memory
//! sink prunes them ([`memory`]).
//!
//! ## Usage Example
//!
//! ```rust
//! use skald_core::fmt::esc;
//! use skald_core::fmt::memory::MemoryLogger;
//!
//! let mut logger = MemoryLogger::new();
//! logger.log(&format!("one{tab}{green}ok", tab = esc::TAB, green = esc::GREEN));
//! logger.log(&format!("three{tab}ok", tab = esc::TAB));
//! logger.log(&format!("x{tab}ok", tab = esc::TAB));
//! // the tab slot grows to the widest observed column; colors are pruned
//! assert_eq!(logger.buffer(), "oneok\nthreeok\nx    ok\n");
//! ```

pub mod ansi;
pub mod autosizes;
pub mod esc;
pub mod interpreter;
pub mod memory;
pub mod width;

// Public API exports
pub use ansi::{AnsiConsoleLogger, AnsiLogger, AnsiSink, LightColorUsage};
pub use autosizes::AutoSizes;
pub use interpreter::{ControlCode, EscapeInterpreter, Sink};
pub use memory::MemoryLogger;
pub use width::{WidthFn, display_width, scalar_width};
