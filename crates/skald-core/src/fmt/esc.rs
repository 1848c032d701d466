//! The internal escape-sequence alphabet.
//!
//! Log messages carry portable escape codes instead of raw ANSI
//! sequences; each output sink translates or prunes them as
//! appropriate. A code is the ESC marker (`\x1b`) followed by a
//! category letter and one parameter character:
//!
//! | code        | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `c0`..`c9`  | foreground color select (9 = reset)       |
//! | `C0`..`C9`  | background color select (9 = reset)       |
//! | `sB` `sI`   | bold / italics                            |
//! | `sr` `sa`   | style reset / reset colors and style      |
//! | `lS` `lE`   | URL start / end                           |
//! | `t0`..`tZ`  | auto-tab with extra padding 0-35          |
//! | `A0`..`AZ`  | end-of-meta marker, also an auto-tab slot |

/// The escape marker character.
pub const MARKER: char = '\x1b';

/// Number of characters following the marker.
pub const CODE_LEN: usize = 2;

pub const RED: &str = "\x1bc0";
pub const GREEN: &str = "\x1bc1";
pub const YELLOW: &str = "\x1bc2";
pub const BLUE: &str = "\x1bc3";
pub const MAGENTA: &str = "\x1bc4";
pub const CYAN: &str = "\x1bc5";
pub const BLACK: &str = "\x1bc6";
pub const WHITE: &str = "\x1bc7";
pub const GRAY: &str = "\x1bc8";
pub const FG_RESET: &str = "\x1bc9";

pub const BG_RED: &str = "\x1bC0";
pub const BG_GREEN: &str = "\x1bC1";
pub const BG_YELLOW: &str = "\x1bC2";
pub const BG_BLUE: &str = "\x1bC3";
pub const BG_MAGENTA: &str = "\x1bC4";
pub const BG_CYAN: &str = "\x1bC5";
pub const BG_BLACK: &str = "\x1bC6";
pub const BG_WHITE: &str = "\x1bC7";
pub const BG_GRAY: &str = "\x1bC8";
pub const BG_RESET: &str = "\x1bC9";

pub const BOLD: &str = "\x1bsB";
pub const ITALICS: &str = "\x1bsI";
pub const STYLE_RESET: &str = "\x1bsr";
pub const RESET: &str = "\x1bsa";

pub const URL_START: &str = "\x1blS";
pub const URL_END: &str = "\x1blE";

/// Go to the next auto-tab stop.
pub const TAB: &str = "\x1bt0";

/// End of the meta information prefix; behaves as an auto-tab stop.
pub const EOMETA: &str = "\x1bA0";

const COLOR_NAMES: [&str; 10] = [
    "RED", "GREEN", "YELLOW", "BLUE", "MAGENTA", "CYAN", "BLACK", "WHITE", "GRAY", "RESET",
];

/// Replace escape codes with readable `{ESC::NAME}` tokens, for
/// diagnostics and tests.
pub fn replace_to_readable(message: &str) -> String {
    let chars: Vec<char> = message.chars().collect();
    let mut out = String::with_capacity(message.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != MARKER {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let c = chars.get(i + 1).copied().unwrap_or(' ');
        let c2 = chars.get(i + 2).copied().unwrap_or(' ');

        out.push_str("{ESC::");
        match c {
            'c' | 'C' => {
                if c == 'C' {
                    out.push_str("BG_");
                }
                match c2.to_digit(10) {
                    Some(digit) if (digit as usize) < COLOR_NAMES.len() => {
                        out.push_str(COLOR_NAMES[digit as usize]);
                    }
                    _ => out.push_str("COL_ERR"),
                }
            }
            's' => out.push_str(match c2 {
                'B' => "BOLD",
                'I' => "ITALICS",
                'r' => "STYLE_RESET",
                'a' => "RESET",
                _ => "STYLE_ERR",
            }),
            'l' => out.push_str(match c2 {
                'S' => "URL_START",
                'E' => "URL_END",
                _ => "URL_ERR",
            }),
            't' => out.push_str("TAB"),
            'A' => out.push_str("EOMETA"),
            _ => out.push_str("ERROR"),
        }
        out.push('}');
        i += 1 + CODE_LEN;
    }
    out
}
