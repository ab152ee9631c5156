//! Text mutation widgets: insertion, deletion, kills, yanks, case changes.
//!
//! Kill widgets route removed text through the kill ring (forward kills
//! append, backward kills prepend); plain deletes do not. The decoder's
//! bookkeeping has already decided whether this kill coalesces with the
//! previous one.

use anyhow::Result;
use std::time::Duration;

use rl_text::motion;

use crate::Editor;

pub(super) fn self_insert(ed: &mut Editor, count: usize, seq: &str) -> bool {
    for _ in 0..count {
        ed.buf.insert(seq);
    }
    true
}

pub(super) fn tab_insert(ed: &mut Editor, count: usize) -> bool {
    for _ in 0..count {
        ed.buf.insert_char('\t');
    }
    true
}

pub(super) fn backward_delete_char(ed: &mut Editor, count: usize) -> bool {
    ed.buf.backspace(count) > 0
}

pub(super) fn delete_char(ed: &mut Editor, count: usize) -> bool {
    !ed.buf.delete_forward(count).is_empty()
}

pub(super) fn exit_or_delete_char(ed: &mut Editor, count: usize) -> bool {
    if ed.buf.is_empty() {
        ed.st.mode = super::Mode::Eof;
        return true;
    }
    delete_char(ed, count)
}

pub(super) fn kill_line(ed: &mut Editor) -> bool {
    let cursor = ed.buf.cursor();
    let end = ed.buf.len();
    let text = ed.buf.delete_range(cursor, end);
    ed.kill_ring.add(&text);
    true
}

pub(super) fn kill_whole_line(ed: &mut Editor) -> bool {
    let text = ed.buf.delete_range(0, ed.buf.len());
    ed.kill_ring.add(&text);
    true
}

pub(super) fn unix_line_discard(ed: &mut Editor) -> bool {
    let cursor = ed.buf.cursor();
    let text = ed.buf.delete_range(0, cursor);
    ed.kill_ring.add_backwards(&text);
    true
}

/// Kill the whitespace-delimited word before the cursor.
pub(super) fn unix_word_rubout(ed: &mut Editor, count: usize) -> bool {
    let chars = ed.buf.chars();
    let mut start = ed.buf.cursor();
    for _ in 0..count {
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
    }
    let cursor = ed.buf.cursor();
    if start == cursor {
        return false;
    }
    let text = ed.buf.delete_range(start, cursor);
    ed.kill_ring.add_backwards(&text);
    true
}

pub(super) fn backward_kill_word(ed: &mut Editor, count: usize) -> bool {
    let cursor = ed.buf.cursor();
    let start = motion::backward_word(ed.buf.chars(), cursor, count);
    if start == cursor {
        return false;
    }
    let text = ed.buf.delete_range(start, cursor);
    ed.kill_ring.add_backwards(&text);
    true
}

pub(super) fn kill_word(ed: &mut Editor, count: usize) -> bool {
    let cursor = ed.buf.cursor();
    let end = motion::forward_word(ed.buf.chars(), cursor, count);
    if end == cursor {
        return false;
    }
    let text = ed.buf.delete_range(cursor, end);
    ed.kill_ring.add(&text);
    true
}

pub(super) fn yank(ed: &mut Editor) -> bool {
    let Some(text) = ed.kill_ring.yank().map(str::to_string) else {
        return false;
    };
    let start = ed.buf.cursor();
    ed.buf.insert(&text);
    ed.st.last_yank_span = Some((start, text.chars().count()));
    true
}

/// Replace the just-yanked region with the previous ring slot.
pub(super) fn yank_pop(ed: &mut Editor) -> bool {
    let Some(text) = ed.kill_ring.yank_pop().map(str::to_string) else {
        return false;
    };
    let Some((start, len)) = ed.st.last_yank_span else {
        return false;
    };
    ed.buf.delete_range(start, start + len);
    ed.buf.set_cursor(start);
    ed.buf.insert(&text);
    ed.st.last_yank_span = Some((start, text.chars().count()));
    true
}

fn transform_word(ed: &mut Editor, count: usize, f: impl Fn(usize, char) -> char) -> bool {
    let cursor = ed.buf.cursor();
    let end = motion::forward_word(ed.buf.chars(), cursor, count);
    if end == cursor {
        return false;
    }
    let replaced: String = ed
        .buf
        .chars()[cursor..end]
        .iter()
        .enumerate()
        .map(|(i, &c)| f(i, c))
        .collect();
    ed.buf.delete_range(cursor, end);
    ed.buf.insert(&replaced);
    true
}

pub(super) fn upcase_word(ed: &mut Editor, count: usize) -> bool {
    transform_word(ed, count, |_, c| c.to_ascii_uppercase())
}

pub(super) fn downcase_word(ed: &mut Editor, count: usize) -> bool {
    transform_word(ed, count, |_, c| c.to_ascii_lowercase())
}

pub(super) fn capitalize_word(ed: &mut Editor, count: usize) -> bool {
    // Uppercase the first alphabetic character, lowercase the rest.
    let cursor = ed.buf.cursor();
    let end = motion::forward_word(ed.buf.chars(), cursor, count);
    if end == cursor {
        return false;
    }
    let mut first_done = false;
    let replaced: String = ed.buf.chars()[cursor..end]
        .iter()
        .map(|&c| {
            if c.is_alphanumeric() && !first_done {
                first_done = true;
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();
    ed.buf.delete_range(cursor, end);
    ed.buf.insert(&replaced);
    true
}

/// Swap the characters around the cursor and advance; at end of line the
/// last two characters swap in place.
pub(super) fn transpose_chars(ed: &mut Editor) -> bool {
    let len = ed.buf.len();
    let cursor = ed.buf.cursor();
    if cursor == 0 || len < 2 {
        return false;
    }
    let (a, b) = if cursor == len {
        (len - 2, len - 1)
    } else {
        (cursor - 1, cursor)
    };
    let ca = ed.buf.char_at(a).expect("in range");
    let cb = ed.buf.char_at(b).expect("in range");
    ed.buf.delete_range(a, b + 1);
    ed.buf.set_cursor(a);
    let mut swapped = String::new();
    swapped.push(cb);
    swapped.push(ca);
    ed.buf.insert(&swapped);
    true
}

/// Insert a closing bracket and briefly park the cursor on its match.
pub(super) fn insert_close(ed: &mut Editor, close: char, open: char) -> bool {
    ed.buf.insert_char(close);
    let Some(pos) = matching_open(ed.buf.chars(), ed.buf.cursor() - 1, open, close) else {
        return true;
    };
    let saved = ed.buf.cursor();
    ed.buf.set_cursor(pos);
    let blink = (|| -> Result<()> {
        ed.redisplay_now()?;
        ed.port.flush()?;
        let _ = ed.port.peek_key(Duration::from_millis(BLINK_MATCHING_PAREN_TIMEOUT))?;
        Ok(())
    })();
    ed.buf.set_cursor(saved);
    blink.is_ok()
}

pub(super) const BLINK_MATCHING_PAREN_TIMEOUT: u64 = 500;

/// Scan backward from `from` (exclusive) for the `open` matching a `close`
/// at `from`, honoring nesting.
pub(super) fn matching_open(chars: &[char], from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = from;
    while i > 0 {
        i -= 1;
        if chars[i] == close {
            depth += 1;
        } else if chars[i] == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

pub(super) fn paste_from_clipboard(ed: &mut Editor) -> bool {
    let Some(clip) = ed.clipboard.as_mut() else {
        return false;
    };
    match clip.get_text() {
        Ok(text) => {
            ed.buf.insert(&text);
            true
        }
        // Clipboard trouble is not worth more than a beep.
        Err(_) => false,
    }
}
