//! Display-width measurement for column accounting.
//!
//! Column positions are advanced by the terminal display width of
//! literal text, not its byte or scalar count. East-Asian wide glyphs
//! occupy two cells. The measurement function is pluggable so sinks
//! with different width rules can supply their own.

use unicode_width::UnicodeWidthStr;

/// A width-measurement function: text to number of output columns.
pub type WidthFn = fn(&str) -> usize;

/// Terminal display width via Unicode east-asian-width rules.
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// One column per Unicode scalar; for sinks without wide-glyph rules.
pub fn scalar_width(text: &str) -> usize {
    text.chars().count()
}
