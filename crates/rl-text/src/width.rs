//! Terminal display width for code points.
//!
//! Width is a function of the code point plus the current column (TAB only).
//! Rules, applied in order:
//! - TAB advances to the next 8-column stop.
//! - Other control characters below 0x20 and DEL render caret-style (`^X`),
//!   occupying two cells.
//! - Everything else defers to `unicode-width` (0 for combining marks, 2 for
//!   East Asian Wide/Fullwidth, else 1).
//!
//! `glyph` returns the printable form alongside the width so the renderer
//! never re-derives the expansion.

use unicode_width::UnicodeWidthChar;

pub const TAB_WIDTH: usize = 8;

/// Cell width of `ch` when printed starting at `col`.
pub fn char_width(ch: char, col: usize) -> usize {
    match ch {
        '\t' => TAB_WIDTH - (col % TAB_WIDTH),
        c if (c as u32) < 0x20 || c == '\u{7f}' => 2,
        c => UnicodeWidthChar::width(c).unwrap_or(0),
    }
}

/// Printable expansion of `ch` at `col` plus its width. TABs become spaces so
/// downstream diffing operates on concrete cells.
pub fn glyph(ch: char, col: usize) -> (String, usize) {
    match ch {
        '\t' => {
            let w = TAB_WIDTH - (col % TAB_WIDTH);
            (" ".repeat(w), w)
        }
        '\u{7f}' => ("^?".to_string(), 2),
        c if (c as u32) < 0x20 => {
            let caret = char::from_u32('@' as u32 + c as u32).unwrap_or('?');
            (format!("^{caret}"), 2)
        }
        c => {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            (c.to_string(), w)
        }
    }
}

/// Total display width of `s` starting at `start_col`.
pub fn str_width(s: &str, start_col: usize) -> usize {
    let mut col = start_col;
    for ch in s.chars() {
        col += char_width(ch, col);
    }
    col - start_col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_single_cell() {
        assert_eq!(char_width('a', 0), 1);
        assert_eq!(str_width("hello", 0), 5);
    }

    #[test]
    fn cjk_is_double_cell() {
        assert_eq!(char_width('界', 0), 2);
        assert_eq!(str_width("世界", 0), 4);
    }

    #[test]
    fn combining_mark_is_zero() {
        assert_eq!(char_width('\u{0301}', 0), 0);
        assert_eq!(str_width("e\u{0301}", 0), 1);
    }

    #[test]
    fn control_renders_caret_pair() {
        assert_eq!(glyph('\u{1}', 0), ("^A".to_string(), 2));
        assert_eq!(glyph('\u{1b}', 0), ("^[".to_string(), 2));
        assert_eq!(glyph('\u{7f}', 0), ("^?".to_string(), 2));
    }

    #[test]
    fn tab_advances_to_stop() {
        assert_eq!(char_width('\t', 0), 8);
        assert_eq!(char_width('\t', 3), 5);
        assert_eq!(char_width('\t', 7), 1);
        assert_eq!(char_width('\t', 8), 8);
    }

    #[test]
    fn tab_width_depends_on_column() {
        // "ab\tc": tab at col 2 spans 6 cells, so total is 2 + 6 + 1.
        assert_eq!(str_width("ab\tc", 0), 9);
        // Same string starting at col 4: tab at col 6 spans 2 cells.
        assert_eq!(str_width("ab\tc", 4), 5);
    }

    #[test]
    fn tab_glyph_expands_to_spaces() {
        let (text, w) = glyph('\t', 5);
        assert_eq!(w, 3);
        assert_eq!(text, "   ");
    }
}
