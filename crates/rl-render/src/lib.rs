//! Incremental redisplay engine.
//!
//! Owns a snapshot of what is physically on screen (wrapped glyph lines plus
//! the cursor cell) and reconciles it against freshly laid-out content with
//! the cheapest updates the terminal supports: per-line hash skip, common
//! prefix/suffix trisection, insert-chars / delete-chars when available,
//! otherwise overwrite plus clear-to-EOL. Visual cursor motion is relative
//! and tracked as a row-major cell index so moves cost a handful of bytes.
//!
//! Wrap handling: on terminals with both auto-margin and the newline glitch
//! a row that fills exactly leaves the wrap *pending*; before the next
//! absolute motion the engine commits it (space + CR) or backs onto the
//! filled row with a bare CR, whichever direction the motion goes.
//!
//! Invariant: after `render` returns, the snapshot equals the laid-out text
//! and `cursor_cell` equals the physical cursor position.

use ahash::AHasher;
use anyhow::Result;
use rl_terminal::{Capability, ConsolePort, TerminalCapabilities};
use rl_text::width::str_width;
use std::hash::Hasher;
use tracing::trace;

pub mod diff;
pub mod layout;

pub use layout::{Layout, layout};

use diff::trisect;

fn hash_line(s: &str) -> u64 {
    let mut h = AHasher::default();
    h.write(s.as_bytes());
    h.finish()
}

#[derive(Debug)]
struct Snapshot {
    lines: Vec<String>,
    hashes: Vec<u64>,
    cols: usize,
}

#[derive(Debug, Default)]
pub struct Redisplay {
    snapshot: Option<Snapshot>,
    cursor_cell: usize,
    pending_wrap: bool,
}

impl Redisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the snapshot so the next `render` repaints everything from the
    /// current cursor position (assumed column 0 of the first edit row).
    pub fn invalidate(&mut self) {
        self.snapshot = None;
        self.cursor_cell = 0;
        self.pending_wrap = false;
    }

    /// Reconcile the screen with `text` (already composed: prompt + display
    /// buffer + optional post lines). `cursor_char` is the char index of the
    /// cursor within `text`.
    pub fn render(&mut self, port: &mut dyn ConsolePort, text: &str, cursor_char: usize) -> Result<()> {
        let cols = port.size().0.max(2) as usize;
        let new = layout(text, cols, cursor_char);
        let hashes: Vec<u64> = new.lines.iter().map(|l| hash_line(l)).collect();

        // A width change invalidates all cell geometry.
        let old = match self.snapshot.take() {
            Some(s) if s.cols == cols => Some(s),
            Some(_) => {
                port.put(Capability::CarriageReturn)?;
                port.put(Capability::ClearToEol)?;
                self.cursor_cell = 0;
                self.pending_wrap = false;
                None
            }
            None => None,
        };
        let old_lines: &[String] = old.as_ref().map(|s| s.lines.as_slice()).unwrap_or(&[]);
        let old_hashes: &[u64] = old.as_ref().map(|s| s.hashes.as_slice()).unwrap_or(&[]);

        let rows = old_lines.len().max(new.lines.len());
        for row in 0..rows {
            match (old_lines.get(row), new.lines.get(row)) {
                (Some(o), Some(n)) => {
                    if old_hashes[row] == hashes[row] && o == n {
                        continue;
                    }
                    self.patch_row(port, row, cols, o, n)?;
                }
                (Some(o), None) => {
                    // Excess old line: blank it.
                    if !o.is_empty() {
                        self.move_to(port, row * cols, cols)?;
                        port.put(Capability::ClearToEol)?;
                    }
                }
                (None, Some(n)) => {
                    self.move_to(port, row * cols, cols)?;
                    self.emit(port, n, cols)?;
                }
                (None, None) => unreachable!(),
            }
        }

        self.move_to(port, new.cursor_cell, cols)?;
        trace!(target: "render", rows = new.lines.len(), cursor = new.cursor_cell, "frame");
        self.snapshot = Some(Snapshot {
            lines: new.lines,
            hashes,
            cols,
        });
        Ok(())
    }

    /// Current physical cursor cell (for tests and blink positioning).
    pub fn cursor_cell(&self) -> usize {
        self.cursor_cell
    }

    fn caps(port: &mut dyn ConsolePort) -> TerminalCapabilities {
        port.capabilities()
    }

    fn patch_row(
        &mut self,
        port: &mut dyn ConsolePort,
        row: usize,
        cols: usize,
        old_line: &str,
        new_line: &str,
    ) -> Result<()> {
        let Some(t) = trisect(old_line, new_line) else {
            return Ok(());
        };
        let base = row * cols;
        let caps = Self::caps(port);
        let ich = caps.contains(TerminalCapabilities::INSERT_DELETE_CHARS);

        if t.old_mid_cells == 0 && t.new_mid_cells > 0 && t.suffix_cells > 0 && ich {
            // Insertion with a preserved tail: open room, print the middle.
            self.move_to(port, base + t.prefix_cells, cols)?;
            port.put(Capability::InsertChars(t.new_mid_cells as u16))?;
            self.emit(port, &t.new_mid, cols)?;
            return Ok(());
        }
        if t.new_mid_cells == 0 && t.old_mid_cells > 0 && t.suffix_cells > 0 && ich {
            // Deletion with a preserved tail: close the gap.
            self.move_to(port, base + t.prefix_cells, cols)?;
            port.put(Capability::DeleteChars(t.old_mid_cells as u16))?;
            return Ok(());
        }

        // General case: overwrite from the first difference, then clear any
        // leftover old cells.
        self.move_to(port, base + t.prefix_cells, cols)?;
        self.emit(port, &t.new_mid, cols)?;
        self.emit(port, &t.suffix, cols)?;
        let new_end = t.prefix_cells + t.new_mid_cells + t.suffix_cells;
        let old_end = t.prefix_cells + t.old_mid_cells + t.suffix_cells;
        if old_end > new_end {
            port.put(Capability::ClearToEol)?;
        }
        Ok(())
    }

    /// Write glyphs at the current cursor, maintaining the cell counter and
    /// the pending-wrap state at exact row fills.
    fn emit(&mut self, port: &mut dyn ConsolePort, s: &str, cols: usize) -> Result<()> {
        if s.is_empty() {
            return Ok(());
        }
        self.pending_wrap = false;
        port.write_text(s)?;
        self.cursor_cell += str_width(s, 0);
        if self.cursor_cell % cols == 0 {
            let caps = Self::caps(port);
            let am = caps.contains(TerminalCapabilities::AUTO_RIGHT_MARGIN);
            let xenl = caps.contains(TerminalCapabilities::EAT_NEWLINE_GLITCH);
            if am && xenl {
                self.pending_wrap = true;
            } else if !am {
                port.write_text("\r\n")?;
            }
        }
        Ok(())
    }

    /// Relative move of the physical cursor to `target`.
    fn move_to(&mut self, port: &mut dyn ConsolePort, target: usize, cols: usize) -> Result<()> {
        if self.pending_wrap {
            self.pending_wrap = false;
            // The cursor physically sits at the margin of the previous row.
            if target >= self.cursor_cell {
                // Commit the wrap; the printed space lands where the next
                // glyph will be painted anyway.
                port.write_text(" \r")?;
            } else {
                port.write_text("\r")?;
                self.cursor_cell -= cols;
            }
        }
        if target == self.cursor_cell {
            return Ok(());
        }
        let (cur_row, cur_col) = (self.cursor_cell / cols, self.cursor_cell % cols);
        let (tgt_row, tgt_col) = (target / cols, target % cols);
        let mut col = cur_col;
        if tgt_row < cur_row {
            port.put(Capability::CursorUp((cur_row - tgt_row) as u16))?;
        } else if tgt_row > cur_row {
            port.put(Capability::CarriageReturn)?;
            port.write_text(&"\n".repeat(tgt_row - cur_row))?;
            col = 0;
        }
        if tgt_col < col {
            if tgt_col == 0 {
                port.put(Capability::CarriageReturn)?;
            } else {
                port.put(Capability::CursorLeft((col - tgt_col) as u16))?;
            }
        } else if tgt_col > col {
            port.put(Capability::CursorRight((tgt_col - col) as u16))?;
        }
        self.cursor_cell = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_terminal::ScriptedConsole;

    fn render_seq(steps: &[(&str, usize)]) -> (ScriptedConsole, Redisplay) {
        let mut port = ScriptedConsole::new(40, 24);
        let mut rd = Redisplay::new();
        for (text, cursor) in steps {
            rd.render(&mut port, text, *cursor).unwrap();
        }
        (port, rd)
    }

    #[test]
    fn initial_paint_writes_everything() {
        let (port, rd) = render_seq(&[("> hello", 7)]);
        assert_eq!(port.transcript(), "> hello");
        assert_eq!(rd.cursor_cell(), 7);
    }

    #[test]
    fn appending_repaints_only_the_tail() {
        let (port, _) = render_seq(&[("> ab", 4), ("> abc", 5)]);
        assert_eq!(port.transcript(), "> abc");
    }

    #[test]
    fn unchanged_frame_moves_nothing() {
        let (port, _) = render_seq(&[("> ab", 4), ("> ab", 4)]);
        assert_eq!(port.transcript(), "> ab");
    }

    #[test]
    fn mid_line_insert_uses_insert_chars() {
        let (port, _) = render_seq(&[("> abcd", 6), ("> abXcd", 5)]);
        // Move left to the insertion point, open one cell, print X.
        assert_eq!(port.transcript(), "> abcd\u{1b}[2D\u{1b}[1@X");
    }

    #[test]
    fn mid_line_delete_uses_delete_chars() {
        let (port, _) = render_seq(&[("> abXcd", 7), ("> abcd", 4)]);
        assert_eq!(port.transcript(), "> abXcd\u{1b}[3D\u{1b}[1P");
    }

    #[test]
    fn shrinking_line_clears_leftovers() {
        let mut port = ScriptedConsole::new(40, 24).with_capabilities(
            TerminalCapabilities::AUTO_RIGHT_MARGIN | TerminalCapabilities::EAT_NEWLINE_GLITCH,
        );
        let mut rd = Redisplay::new();
        rd.render(&mut port, "> hello", 7).unwrap();
        rd.render(&mut port, "> he", 4).unwrap();
        // No DCH available: overwrite path clears the stale tail.
        assert!(port.transcript().contains("\u{1b}[K"));
    }

    #[test]
    fn post_line_painted_below() {
        let (port, _) = render_seq(&[("> a", 3), ("> a\npost", 3)]);
        let t = port.transcript();
        assert!(t.contains("\r\npost"), "transcript: {t:?}");
        // Final cursor returns to row 0.
        assert!(t.contains("\u{1b}[1A"), "transcript: {t:?}");
    }

    #[test]
    fn removed_post_line_cleared() {
        let (port, _) = render_seq(&[("> a\npost", 3), ("> a", 3)]);
        let t = port.transcript();
        assert!(t.ends_with("\u{1b}[K\u{1b}[1A\u{1b}[3C") || t.contains("\u{1b}[K"), "transcript: {t:?}");
    }

    #[test]
    fn wrap_pending_committed_with_space_cr() {
        let mut port = ScriptedConsole::new(4, 24);
        let mut rd = Redisplay::new();
        rd.render(&mut port, "abcdef", 6).unwrap();
        let t = port.transcript();
        // Row fills exactly at "abcd"; the wrap is committed before "ef".
        assert!(t.contains("abcd \ref"), "transcript: {t:?}");
    }

    #[test]
    fn width_change_forces_repaint() {
        let mut port = ScriptedConsole::new(40, 24);
        let mut rd = Redisplay::new();
        rd.render(&mut port, "> hello", 7).unwrap();
        rd.render(&mut port, "> hello", 7).unwrap();
        // Same text, same width: nothing further was written.
        assert_eq!(port.transcript(), "> hello");
        let mut narrow = ScriptedConsole::new(40, 24);
        let mut rd2 = Redisplay::new();
        rd2.render(&mut narrow, "> hi", 4).unwrap();
        rd2.invalidate();
        narrow.write_text("\r").unwrap();
        rd2.render(&mut narrow, "> hi", 4).unwrap();
        assert!(narrow.transcript().ends_with("\r> hi"));
    }

    #[test]
    fn cursor_only_change_emits_motion() {
        let (port, rd) = render_seq(&[("> hello", 7), ("> hello", 2)]);
        assert_eq!(rd.cursor_cell(), 2);
        assert!(port.transcript().ends_with("\u{1b}[5D"));
    }
}
