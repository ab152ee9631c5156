//! Cell layout: logical text to wrapped screen lines.
//!
//! The input is the composed text (prompt + display form of the buffer +
//! optional post lines separated by `\n`). Every code point expands to its
//! printable glyph (`^X` for controls, spaces for TAB) and lines are packed
//! at the column limit. Zero-width marks attach to the preceding glyph; a
//! wide glyph that would straddle the margin wraps early, leaving a one-cell
//! gap at the end of the row.
//!
//! Cell addressing is row-major: cell = row * columns + column. The cursor
//! is reported in those terms so the engine can translate it to relative
//! motions.

use rl_text::width::{TAB_WIDTH, char_width, glyph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Wrapped screen lines of printable glyphs, each at most `cols` wide.
    pub lines: Vec<String>,
    /// Row-major cell index for the requested cursor position.
    pub cursor_cell: usize,
}

/// Lay `text` out at `cols` columns, tracking the cell of the code point at
/// char index `cursor_char` (indices past the end pin the cursor after the
/// last glyph).
pub fn layout(text: &str, cols: usize, cursor_char: usize) -> Layout {
    let cols = cols.max(2);
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut col = 0usize;
    let mut cursor_cell = None;

    let close_line = |lines: &mut Vec<String>, cur: &mut String, col: &mut usize| {
        lines.push(std::mem::take(cur));
        *col = 0;
    };

    for (i, ch) in text.chars().enumerate() {
        if cursor_cell.is_none() && i == cursor_char {
            cursor_cell = Some(lines.len() * cols + col);
        }
        if ch == '\n' {
            close_line(&mut lines, &mut cur, &mut col);
            continue;
        }
        if ch == '\t' {
            // Advance to the next stop, clamped at the margin.
            let advance = (TAB_WIDTH - (col % TAB_WIDTH)).min(cols - col);
            cur.push_str(&" ".repeat(advance));
            col += advance;
            if col == cols {
                close_line(&mut lines, &mut cur, &mut col);
            }
            continue;
        }
        let w = char_width(ch, col);
        if w == 0 {
            // Combining mark: travels with its base glyph.
            cur.push(ch);
            continue;
        }
        if col + w > cols {
            // Early wrap for a wide glyph at the margin.
            cur.push(' ');
            close_line(&mut lines, &mut cur, &mut col);
        }
        let (g, gw) = glyph(ch, col);
        cur.push_str(&g);
        col += gw;
        if col == cols {
            close_line(&mut lines, &mut cur, &mut col);
        }
    }
    let end_cell = lines.len() * cols + col;
    lines.push(cur);
    Layout {
        lines,
        cursor_cell: cursor_cell.unwrap_or(end_cell),
    }
}
