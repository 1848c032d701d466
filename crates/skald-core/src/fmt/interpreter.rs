//! Escape-sequence interpretation with column tracking.
//!
//! The interpreter scans a message left-to-right, writes literal runs
//! to a [`Sink`], pads to auto-tab stops, and either forwards style and
//! color codes to the sink or prunes them. The only state surviving a
//! message is the [`AutoSizes`] table; the column counter and the slot
//! cursor reset at the start of every message and after each embedded
//! line break.

use crate::fmt::autosizes::AutoSizes;
use crate::fmt::esc;
use crate::fmt::width::{WidthFn, display_width};
use tracing::warn;

/// A decoded control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Foreground color select; index 0-9 where 9 resets.
    Fg(u8),
    /// Background color select; index 0-9 where 9 resets.
    Bg(u8),
    Bold,
    Italics,
    StyleReset,
    ResetAll,
    UrlStart,
    UrlEnd,
}

/// Receiver of interpreter output: literal runs and control actions.
pub trait Sink {
    fn write_literal(&mut self, text: &str);
    fn control(&mut self, code: ControlCode);
}

/// Stateful scanner for the escape alphabet defined in [`esc`].
pub struct EscapeInterpreter {
    auto_sizes: AutoSizes,
    column: usize,
    /// Remove style/color codes instead of forwarding them.
    pub prune_escapes: bool,
    width_fn: WidthFn,
    spaces: String,
}

impl EscapeInterpreter {
    pub fn new(prune_escapes: bool) -> Self {
        Self {
            auto_sizes: AutoSizes::new(),
            column: 0,
            prune_escapes,
            width_fn: display_width,
            spaces: String::new(),
        }
    }

    /// Replace the width metric used for column accounting.
    pub fn with_width_fn(mut self, width_fn: WidthFn) -> Self {
        self.width_fn = width_fn;
        self
    }

    pub fn auto_sizes(&self) -> &AutoSizes {
        &self.auto_sizes
    }

    pub fn auto_sizes_mut(&mut self) -> &mut AutoSizes {
        &mut self.auto_sizes
    }

    /// Process one message. The column counter starts at zero; learned
    /// tab widths carry over from earlier messages.
    pub fn process(&mut self, message: &str, sink: &mut dyn Sink) {
        self.column = 0;
        self.auto_sizes.restart();

        let mut rest = message;
        loop {
            match rest.find(esc::MARKER) {
                None => {
                    self.emit_literal(rest, sink);
                    return;
                }
                Some(idx) => {
                    self.emit_literal(&rest[..idx], sink);
                    rest = &rest[idx..];
                    rest = self.dispatch_code(rest, sink);
                }
            }
        }
    }

    /// Write a literal run, tracking the column and resetting it at
    /// embedded line breaks.
    fn emit_literal(&mut self, text: &str, sink: &mut dyn Sink) {
        if text.is_empty() {
            return;
        }
        let mut first = true;
        for line in text.split('\n') {
            if !first {
                sink.write_literal("\n");
                self.column = 0;
                self.auto_sizes.restart();
            }
            first = false;
            if !line.is_empty() {
                sink.write_literal(line);
                self.column += (self.width_fn)(line);
            }
        }
    }

    /// Decode the escape code at the start of `rest` (which begins with
    /// the marker) and return the remainder.
    fn dispatch_code<'a>(&mut self, rest: &'a str, sink: &mut dyn Sink) -> &'a str {
        let mut chars = rest.char_indices();
        chars.next(); // the marker
        let Some((_, code)) = chars.next() else {
            // truncated: a bare marker at the end of the message
            self.pass_unknown(rest, sink);
            return "";
        };
        let Some((param_idx, param)) = chars.next() else {
            self.pass_unknown(rest, sink);
            return "";
        };
        let consumed = param_idx + param.len_utf8();

        let control = match code {
            't' | 'A' => {
                match decode_extra(param) {
                    Some(extra) => self.auto_tab(extra, sink),
                    None => self.pass_unknown(&rest[..consumed], sink),
                }
                return &rest[consumed..];
            }
            'c' | 'C' => match param.to_digit(10) {
                Some(digit) => {
                    let digit = digit as u8;
                    if code == 'c' {
                        Some(ControlCode::Fg(digit))
                    } else {
                        Some(ControlCode::Bg(digit))
                    }
                }
                None => None,
            },
            's' => match param {
                'B' => Some(ControlCode::Bold),
                'I' => Some(ControlCode::Italics),
                'r' => Some(ControlCode::StyleReset),
                'a' => Some(ControlCode::ResetAll),
                _ => None,
            },
            'l' => match param {
                'S' => Some(ControlCode::UrlStart),
                'E' => Some(ControlCode::UrlEnd),
                _ => None,
            },
            _ => None,
        };

        match control {
            Some(control) => {
                if !self.prune_escapes {
                    sink.control(control);
                }
            }
            None => self.pass_unknown(&rest[..consumed], sink),
        }
        &rest[consumed..]
    }

    /// Pad with spaces to the next auto-tab stop.
    fn auto_tab(&mut self, extra: usize, sink: &mut dyn Sink) {
        let stop = self.auto_sizes.next(self.column, extra);
        let pad = stop.saturating_sub(self.column);
        if pad > 0 {
            if self.spaces.len() < pad {
                self.spaces = " ".repeat(pad);
            }
            sink.write_literal(&self.spaces[..pad]);
            self.column += pad;
        }
    }

    /// An unknown or truncated sequence: warn, then pass it through raw
    /// unless pruning. Passed-through bytes do not advance the column.
    fn pass_unknown(&mut self, raw: &str, sink: &mut dyn Sink) {
        warn!(
            event = "fmt.sequence.unknown",
            sequence = %esc::replace_to_readable(raw),
            pruned = self.prune_escapes,
        );
        if !self.prune_escapes {
            sink.write_literal(raw);
        }
    }
}

/// Decode the auto-tab extra-padding parameter: `'0'..'9'` then
/// `'A'..'Z'` for amounts 10-35.
fn decode_extra(param: char) -> Option<usize> {
    match param {
        '0'..='9' => Some(param as usize - '0' as usize),
        'A'..='Z' => Some(param as usize - 'A' as usize + 10),
        _ => None,
    }
}
