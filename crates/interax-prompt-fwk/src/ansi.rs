//! ANSI-aware text measurement.
//!
//! Everything the screen manager and the paginator need to reason about
//! rendered text: escape sequences are zero columns wide and zero rows
//! high, wide characters take two columns, and lines are hard-wrapped at
//! the terminal width without breaking an escape sequence apart.
//!
//! Recognised escape sequences:
//! - CSI: `ESC [` ... final byte (0x40-0x7E)
//! - OSC: `ESC ]` ... BEL or ST (`ESC \`)
//! - DCS/PM/APC: `ESC P`/`ESC ^`/`ESC _` ... ST
//! - Two-character sequences: `ESC` + one byte

use std::borrow::Cow;

use crossterm::Command;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ESC: u8 = 0x1B;

/// Strip ANSI escape sequences from a string.
///
/// Returns `Cow::Borrowed` when there is nothing to strip.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESC {
            i = skip_escape_sequence(bytes, i);
        } else {
            // ESC is single-byte ASCII, so slicing between ESC positions
            // never splits a UTF-8 sequence.
            let start = i;
            while i < bytes.len() && bytes[i] != ESC {
                i += 1;
            }
            result.push_str(&s[start..i]);
        }
    }

    Cow::Owned(result)
}

/// Terminal columns taken by `s` once escape sequences are removed.
pub fn display_width(s: &str) -> usize {
    strip_ansi(s).width()
}

/// The text after the last newline.
pub fn last_line(s: &str) -> &str {
    s.rsplit('\n').next().unwrap_or(s)
}

/// Number of rows `s` occupies, counting newlines only.
pub fn line_height(s: &str) -> usize {
    s.split('\n').count()
}

/// Hard-wrap every line of `text` so no row is wider than `width` columns.
///
/// Existing newlines are kept. Escape sequences are copied through
/// untouched and do not count towards the width.
pub fn break_lines(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(text.len() + text.len() / width.max(8));

    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        wrap_line(line, width, &mut out);
    }

    out
}

fn wrap_line(line: &str, width: usize, out: &mut String) {
    let bytes = line.as_bytes();
    let mut column = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESC {
            let end = skip_escape_sequence(bytes, i);
            out.push_str(&line[i..end]);
            i = end;
            continue;
        }

        let Some(ch) = line[i..].chars().next() else {
            break;
        };
        let ch_width = ch.width().unwrap_or(0);
        if column > 0 && column + ch_width > width {
            out.push('\n');
            column = 0;
        }
        out.push(ch);
        column += ch_width;
        i += ch.len_utf8();
    }
}

/// Render a crossterm command to its ANSI text, for embedding in content.
pub fn command_string(command: impl Command) -> String {
    let mut s = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut s);
    s
}

/// Skip an escape sequence starting at `pos` (which points at ESC).
/// Returns the byte index after the complete sequence.
fn skip_escape_sequence(bytes: &[u8], pos: usize) -> usize {
    let next = pos + 1;
    if next >= bytes.len() {
        return bytes.len();
    }

    match bytes[next] {
        b'[' => skip_csi(bytes, next + 1),
        b']' | b'P' | b'^' | b'_' => skip_string_terminated(bytes, next + 1),
        // Two-character sequence, but never swallow the start of a
        // multi-byte character.
        b if b.is_ascii() => next + 1,
        _ => next,
    }
}

/// Skip a CSI sequence. `pos` is the byte after `[`.
fn skip_csi(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;

    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x7E).contains(&b) {
            return i;
        }
        i += 1;
    }

    bytes.len()
}

/// Skip an OSC/DCS/PM/APC body. `pos` is the byte after the type indicator.
fn skip_string_terminated(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;

    while i < bytes.len() {
        match bytes[i] {
            0x07 => return i + 1,
            ESC if i + 1 < bytes.len() && bytes[i + 1] == b'\\' => return i + 2,
            _ => i += 1,
        }
    }

    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ansi_borrows() {
        assert!(matches!(strip_ansi("hello"), Cow::Borrowed(_)));
        assert_eq!(strip_ansi("hello"), "hello");
    }

    #[test]
    fn strips_colors_and_cursor_moves() {
        assert_eq!(strip_ansi("\x1b[38;5;196mred\x1b[0m"), "red");
        assert_eq!(strip_ansi("\x1b[2K\x1b[1Atext\x1b[?25l"), "text");
    }

    #[test]
    fn strips_osc_hyperlinks() {
        assert_eq!(
            strip_ansi("\x1b]8;;https://example.com\x07click\x1b]8;;\x1b\\"),
            "click"
        );
    }

    #[test]
    fn width_ignores_escapes_and_counts_wide_chars() {
        assert_eq!(display_width("\x1b[1mbold\x1b[0m"), 4);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn breaks_at_width() {
        assert_eq!(break_lines("abcdef", 3), "abc\ndef");
        assert_eq!(break_lines("abcdefg", 3), "abc\ndef\ng");
        assert_eq!(break_lines("ab\ncdef", 3), "ab\ncde\nf");
    }

    #[test]
    fn exact_width_does_not_add_empty_row() {
        assert_eq!(break_lines("abc", 3), "abc");
    }

    #[test]
    fn breaking_keeps_escapes_intact() {
        let wrapped = break_lines("\x1b[31mabcd\x1b[0m", 2);
        assert_eq!(wrapped, "\x1b[31mab\ncd\x1b[0m");
        assert_eq!(strip_ansi(&wrapped), "ab\ncd");
    }

    #[test]
    fn wide_char_moves_to_next_row() {
        assert_eq!(break_lines("a日", 2), "a\n日");
    }

    #[test]
    fn last_line_and_height() {
        assert_eq!(last_line("a\nb\nc"), "c");
        assert_eq!(last_line("abc"), "abc");
        assert_eq!(last_line("abc\n"), "");
        assert_eq!(line_height("a\nb\nc"), 3);
        assert_eq!(line_height(""), 1);
    }

    #[test]
    fn command_text() {
        assert_eq!(command_string(crossterm::cursor::Hide), "\x1b[?25l");
    }
}
