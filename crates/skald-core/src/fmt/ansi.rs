//! ANSI terminal sink and logger.
//!
//! Control codes are translated into concrete ANSI escape sequences
//! from a fixed table: ten colors by placement (foreground/background)
//! by intensity (normal/light). Which placement receives the light
//! variant is a readability choice driven by [`LightColorUsage`]: on a
//! dark terminal background, light foreground colors over dark
//! background colors read best, and vice versa.

use crate::fmt::interpreter::{ControlCode, EscapeInterpreter, Sink};
use std::io::Write;

/// Where light color variants are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightColorUsage {
    /// Always the normal variants.
    Never,
    /// Light foreground colors, dark background colors.
    #[default]
    Foreground,
    /// Light background colors, dark foreground colors.
    Background,
}

const ANSI_FG: [&str; 10] = [
    "\x1b[31m",
    "\x1b[32m",
    "\x1b[33m",
    "\x1b[34m",
    "\x1b[35m",
    "\x1b[36m",
    "\x1b[30m",
    "\x1b[38;5;15m",
    "\x1b[38;5;240m",
    "\x1b[39m",
];

const ANSI_BG: [&str; 10] = [
    "\x1b[41m",
    "\x1b[42m",
    "\x1b[43m",
    "\x1b[44m",
    "\x1b[45m",
    "\x1b[46m",
    "\x1b[40m",
    "\x1b[48;5;15m",
    "\x1b[48;5;240m",
    "\x1b[49m",
];

const ANSI_FG_LIGHT: [&str; 10] = [
    "\x1b[38;5;09m",
    "\x1b[38;5;10m",
    "\x1b[38;5;11m",
    "\x1b[38;5;12m",
    "\x1b[38;5;13m",
    "\x1b[38;5;14m",
    "\x1b[30m",
    "\x1b[38;5;15m",
    "\x1b[38;5;250m",
    "\x1b[39m",
];

const ANSI_BG_LIGHT: [&str; 10] = [
    "\x1b[48;5;09m",
    "\x1b[48;5;10m",
    "\x1b[48;5;11m",
    "\x1b[48;5;12m",
    "\x1b[48;5;13m",
    "\x1b[48;5;14m",
    "\x1b[40m",
    "\x1b[48;5;15m",
    "\x1b[48;5;250m",
    "\x1b[49m",
];

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALICS: &str = "\x1b[3m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_URL_START: &str = "\x1b[4m";
const ANSI_URL_END: &str = "\x1b[24m";

/// Resolve a color selection to its ANSI sequence.
///
/// An out-of-range index is an internal consistency error: the
/// interpreter only ever produces indices 0-9.
pub fn ansi_color(color: u8, background: bool, light: bool) -> &'static str {
    let table = match (background, light) {
        (false, false) => &ANSI_FG,
        (true, false) => &ANSI_BG,
        (false, true) => &ANSI_FG_LIGHT,
        (true, true) => &ANSI_BG_LIGHT,
    };
    debug_assert!((color as usize) < table.len(), "color index out of range");
    table[color as usize]
}

/// Sink translating control codes into ANSI sequences on a writer.
pub struct AnsiSink<W: Write> {
    writer: W,
    pub use_light_colors: LightColorUsage,
}

impl<W: Write> AnsiSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            use_light_colors: LightColorUsage::default(),
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for AnsiSink<W> {
    fn write_literal(&mut self, text: &str) {
        let _ = self.writer.write_all(text.as_bytes());
    }

    fn control(&mut self, code: ControlCode) {
        let sequence = match code {
            ControlCode::Fg(color) => ansi_color(
                color,
                false,
                self.use_light_colors == LightColorUsage::Foreground,
            ),
            ControlCode::Bg(color) => ansi_color(
                color,
                true,
                self.use_light_colors == LightColorUsage::Background,
            ),
            ControlCode::Bold => ANSI_BOLD,
            ControlCode::Italics => ANSI_ITALICS,
            ControlCode::StyleReset => ANSI_RESET,
            ControlCode::ResetAll => ANSI_RESET,
            ControlCode::UrlStart => ANSI_URL_START,
            ControlCode::UrlEnd => ANSI_URL_END,
        };
        let _ = self.writer.write_all(sequence.as_bytes());
    }
}

/// Logger translating the escape alphabet to ANSI on any writer.
pub struct AnsiLogger<W: Write> {
    sink: AnsiSink<W>,
    interpreter: EscapeInterpreter,
}

impl<W: Write> AnsiLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            sink: AnsiSink::new(writer),
            interpreter: EscapeInterpreter::new(false),
        }
    }

    pub fn set_light_colors(&mut self, usage: LightColorUsage) {
        self.sink.use_light_colors = usage;
    }

    /// Interpret the message and write it, followed by a newline and a
    /// full reset so one line cannot bleed styles into the next.
    pub fn log(&mut self, message: &str) {
        self.interpreter.process(message, &mut self.sink);
        self.sink.control(ControlCode::ResetAll);
        self.sink.write_literal("\n");
        let _ = self.sink.writer.flush();
    }

    pub fn auto_sizes(&self) -> &crate::fmt::autosizes::AutoSizes {
        self.interpreter.auto_sizes()
    }

    pub fn auto_sizes_mut(&mut self) -> &mut crate::fmt::autosizes::AutoSizes {
        self.interpreter.auto_sizes_mut()
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

/// An [`AnsiLogger`] on standard output.
pub type AnsiConsoleLogger = AnsiLogger<std::io::Stdout>;

impl AnsiLogger<std::io::Stdout> {
    pub fn stdout() -> Self {
        AnsiLogger::new(std::io::stdout())
    }
}
