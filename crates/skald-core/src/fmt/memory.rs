//! In-memory plain-text logger.
//!
//! Collects interpreted messages into a string buffer. Style and color
//! codes are pruned; auto-tab padding still applies, so buffered lines
//! align exactly like their console counterparts.

use crate::fmt::interpreter::{ControlCode, EscapeInterpreter, Sink};

struct BufferSink<'a> {
    buffer: &'a mut String,
}

impl Sink for BufferSink<'_> {
    fn write_literal(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn control(&mut self, _code: ControlCode) {
        // pruned output: control codes carry no textual representation
    }
}

/// Logger accumulating plain text in memory.
pub struct MemoryLogger {
    buffer: String,
    interpreter: EscapeInterpreter,
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            interpreter: EscapeInterpreter::new(true),
        }
    }

    /// Interpret the message and append it to the buffer with a
    /// trailing newline.
    pub fn log(&mut self, message: &str) {
        let mut sink = BufferSink {
            buffer: &mut self.buffer,
        };
        self.interpreter.process(message, &mut sink);
        self.buffer.push('\n');
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Clear the buffered text; learned tab widths survive.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn auto_sizes(&self) -> &crate::fmt::autosizes::AutoSizes {
        self.interpreter.auto_sizes()
    }

    pub fn auto_sizes_mut(&mut self) -> &mut crate::fmt::autosizes::AutoSizes {
        self.interpreter.auto_sizes_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::esc::{BOLD, RED, TAB};

    #[test]
    fn test_codes_pruned() {
        let mut logger = MemoryLogger::new();
        logger.log(&format!("{RED}error{BOLD}!"));
        assert_eq!(logger.buffer(), "error!\n");
    }

    #[test]
    fn test_lines_align_over_time() {
        let mut logger = MemoryLogger::new();
        logger.log(&format!("module/a{TAB}started"));
        logger.log(&format!("m/b{TAB}stopped"));
        let lines: Vec<&str> = logger.buffer().lines().collect();
        let col_a = lines[0].find("started").unwrap();
        let col_b = lines[1].find("stopped").unwrap();
        assert_eq!(col_a, col_b);
    }

    #[test]
    fn test_clear_keeps_tab_memory() {
        let mut logger = MemoryLogger::new();
        logger.log(&format!("wide-prefix{TAB}x"));
        logger.clear();
        logger.log(&format!("p{TAB}x"));
        assert_eq!(logger.buffer(), "p          x\n");
    }
}
