//! vi widgets: operators, motions, mode transitions, character search.
//!
//! Operators set a pending mode and let the next motion define the span
//! (`normal_dispatch` completes it); the doubled operator acts on the whole
//! line from inside the widget, clearing the pending mode so the generic
//! completion is skipped. Deleted and yanked text lands in the unnamed
//! register (`yank_buffer`), which `p`/`P` read.

use anyhow::Result;

use rl_text::motion;

use super::Mode;
use crate::Editor;

pub(super) fn enter_insert(ed: &mut Editor) {
    ed.keymap_name = "vi-insert".to_string();
    ed.st.mode = Mode::Normal;
}

/// ESC out of insert (or cancel a pending operator): back to the movement
/// map, cursor pulled onto the last character.
pub(super) fn movement_mode(ed: &mut Editor) -> bool {
    let from_insert = ed.keymap_name() == "vi-insert";
    ed.keymap_name = "vi-move".to_string();
    ed.st.mode = Mode::Normal;
    if from_insert {
        ed.buf.move_cursor(-1);
    }
    true
}

pub(super) fn delete_to(ed: &mut Editor) -> bool {
    if ed.st.mode == Mode::ViDeleteTo {
        // dd: whole line.
        ed.st.yank_buffer = ed.buf.delete_range(0, ed.buf.len());
        ed.st.mode = Mode::Normal;
    } else {
        ed.st.mode = Mode::ViDeleteTo;
    }
    true
}

pub(super) fn change_to(ed: &mut Editor) -> bool {
    if ed.st.mode == Mode::ViChangeTo {
        // cc: change the whole line.
        ed.st.yank_buffer = ed.buf.delete_range(0, ed.buf.len());
        enter_insert(ed);
    } else {
        ed.st.mode = Mode::ViChangeTo;
    }
    true
}

pub(super) fn yank_to(ed: &mut Editor) -> bool {
    if ed.st.mode == Mode::ViYankTo {
        // yy: whole line, cursor unmoved.
        ed.st.yank_buffer = ed.buf.to_line();
        ed.st.mode = Mode::Normal;
    } else {
        ed.st.mode = Mode::ViYankTo;
    }
    true
}

pub(super) fn delete_to_eol(ed: &mut Editor) -> bool {
    let cursor = ed.buf.cursor();
    ed.st.yank_buffer = ed.buf.delete_range(cursor, ed.buf.len());
    true
}

pub(super) fn change_to_eol(ed: &mut Editor) -> bool {
    delete_to_eol(ed);
    enter_insert(ed);
    true
}

pub(super) fn kill_whole_line(ed: &mut Editor) -> bool {
    ed.st.yank_buffer = ed.buf.delete_range(0, ed.buf.len());
    enter_insert(ed);
    true
}

/// `p` pastes after the cursor, `P` at it; the cursor lands on the last
/// pasted character.
pub(super) fn put(ed: &mut Editor, count: usize, seq: &str) -> bool {
    if ed.st.yank_buffer.is_empty() {
        return false;
    }
    let after = seq.ends_with('p');
    if after && !ed.buf.is_empty() {
        ed.buf.move_cursor(1);
    }
    let text = ed.st.yank_buffer.clone();
    for _ in 0..count {
        ed.buf.insert(&text);
    }
    ed.buf.move_cursor(-1);
    true
}

pub(super) fn delete_under(ed: &mut Editor, count: usize) -> bool {
    let removed = ed.buf.delete_forward(count);
    if removed.is_empty() {
        return false;
    }
    ed.st.yank_buffer = removed;
    true
}

pub(super) fn rubout(ed: &mut Editor, count: usize) -> bool {
    let cursor = ed.buf.cursor();
    let start = cursor.saturating_sub(count);
    if start == cursor {
        return false;
    }
    ed.st.yank_buffer = ed.buf.substring(start, cursor);
    ed.buf.backspace(cursor - start);
    true
}

/// `r`: replace `count` characters with the next typed one. ESC cancels.
pub(super) fn change_char(ed: &mut Editor, count: usize) -> Result<bool> {
    let Some(ch) = ed.read_raw_char()? else {
        return Ok(false);
    };
    if ch == '\u{1b}' {
        return Ok(false);
    }
    let cursor = ed.buf.cursor();
    if cursor + count > ed.buf.len() {
        return Ok(false);
    }
    ed.buf.delete_forward(count);
    for _ in 0..count {
        ed.buf.insert_char(ch);
    }
    ed.buf.move_cursor(-1);
    Ok(true)
}

/// `~`: toggle case under the cursor and advance.
pub(super) fn change_case(ed: &mut Editor, count: usize) -> bool {
    let mut changed = false;
    for _ in 0..count {
        let Some(ch) = ed.buf.current() else { break };
        let flipped = if ch.is_uppercase() {
            ch.to_ascii_lowercase()
        } else {
            ch.to_ascii_uppercase()
        };
        let cursor = ed.buf.cursor();
        ed.buf.delete_forward(1);
        ed.buf.insert_char(flipped);
        ed.buf.set_cursor(cursor + 1);
        changed = true;
    }
    changed
}

pub(super) fn prev_word(ed: &mut Editor, count: usize) -> bool {
    let from = ed.buf.cursor();
    let to = motion::vi_prev_word(ed.buf.chars(), from, count);
    ed.buf.set_cursor(to);
    to != from
}

pub(super) fn next_word(ed: &mut Editor, count: usize) -> bool {
    let from = ed.buf.cursor();
    // `cw` stops at the end of the word rather than eating the separator,
    // the way vi treats it as `ce`.
    let to = if ed.st.mode == Mode::ViChangeTo {
        motion::vi_end_word(ed.buf.chars(), from.saturating_sub(1), count) + 1
    } else {
        motion::vi_next_word(ed.buf.chars(), from, count)
    };
    ed.buf.set_cursor(to);
    ed.buf.cursor() != from
}

/// `e`: onto the last character of the word; as an operator motion the
/// target character is included in the span.
pub(super) fn end_word(ed: &mut Editor, count: usize) -> bool {
    let from = ed.buf.cursor();
    let mut to = motion::vi_end_word(ed.buf.chars(), from, count);
    if ed.st.mode.is_vi_operator() {
        to += 1;
    }
    ed.buf.set_cursor(to);
    ed.buf.cursor() != from
}

pub(super) fn first_print(ed: &mut Editor) -> bool {
    let to = motion::first_print(ed.buf.chars());
    ed.buf.set_cursor(to);
    true
}

/// `|`: to column `count` (1-based).
pub(super) fn column(ed: &mut Editor, count: usize) -> bool {
    ed.buf.set_cursor(count.saturating_sub(1));
    true
}

pub(super) fn previous_history(ed: &mut Editor) -> bool {
    if !super::motion::previous_history(ed) {
        return false;
    }
    first_print(ed)
}

pub(super) fn next_history(ed: &mut Editor) -> bool {
    if !super::motion::next_history(ed) {
        return false;
    }
    first_print(ed)
}

pub(super) fn beginning_of_line_or_arg_digit(ed: &mut Editor) -> bool {
    if ed.st.repeat_count > 0 {
        ed.st.repeat_count = ed.st.repeat_count.saturating_mul(10);
        ed.st.is_arg_digit = true;
        return true;
    }
    ed.buf.set_cursor(0);
    true
}

pub(super) fn arg_digit(ed: &mut Editor, seq: &str) -> bool {
    let Some(digit) = seq.chars().last().and_then(|c| c.to_digit(10)) else {
        return false;
    };
    ed.st.repeat_count = ed.st.repeat_count.saturating_mul(10).saturating_add(digit);
    ed.st.is_arg_digit = true;
    true
}

pub(super) fn eof_maybe(ed: &mut Editor, count: usize) -> bool {
    if ed.buf.is_empty() {
        ed.st.mode = Mode::Eof;
        return true;
    }
    super::edit::delete_char(ed, count)
}

/// `%`: jump to the bracket matching the one at or after the cursor.
pub(super) fn match_bracket(ed: &mut Editor) -> bool {
    const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];
    let chars = ed.buf.chars();
    let Some((pos, open, close, forward)) = chars
        .iter()
        .enumerate()
        .skip(ed.buf.cursor())
        .find_map(|(i, &c)| {
            PAIRS.iter().find_map(|&(o, cl)| {
                if c == o {
                    Some((i, o, cl, true))
                } else if c == cl {
                    Some((i, o, cl, false))
                } else {
                    None
                }
            })
        })
    else {
        return false;
    };
    let target = if forward {
        matching_close(chars, pos, open, close)
    } else {
        super::edit::matching_open(chars, pos, open, close)
    };
    let Some(mut target) = target else {
        return false;
    };
    // Inside an operator span the landing bracket is included.
    if ed.st.mode.is_vi_operator() && target > ed.buf.cursor() {
        target += 1;
    }
    ed.buf.set_cursor(target);
    true
}

fn matching_close(chars: &[char], from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(from) {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// f/F/t/T plus the `;`/`,` repeats.
pub(super) fn char_search(ed: &mut Editor, count: usize, seq: &str) -> Result<bool> {
    let invoker = seq.chars().last().unwrap_or('f');
    let (target, invoker, search) = match invoker {
        ';' | ',' => {
            let Some(prev) = ed.st.char_search else {
                return Ok(false);
            };
            let repeat = if invoker == ';' {
                prev.last_invoker
            } else {
                // Flip direction relative to the last run.
                flip(prev.last_invoker)
            };
            (prev.target, prev.invoker, repeat)
        }
        _ => {
            let Some(target) = ed.read_raw_char()? else {
                return Ok(false);
            };
            if target == '\u{1b}' {
                return Ok(false);
            }
            (target, invoker, invoker)
        }
    };
    ed.st.char_search = Some(super::CharSearch {
        target,
        invoker,
        last_invoker: search,
    });

    let chars = ed.buf.chars();
    let forward = search.is_lowercase();
    let stop_short = search.eq_ignore_ascii_case(&'t');
    let mut pos = ed.buf.cursor();
    for _ in 0..count {
        let next = if forward {
            (pos + 1..chars.len()).find(|&i| chars[i] == target)
        } else {
            (0..pos).rev().find(|&i| chars[i] == target)
        };
        match next {
            Some(i) => pos = i,
            None => return Ok(false),
        }
    }
    if stop_short {
        if forward {
            pos = pos.saturating_sub(1);
        } else {
            pos += 1;
        }
    }
    // As an operator motion a forward landing includes the target cell.
    if ed.st.mode.is_vi_operator() && forward {
        pos += 1;
    }
    ed.buf.set_cursor(pos);
    Ok(true)
}

fn flip(invoker: char) -> char {
    if invoker.is_uppercase() {
        invoker.to_ascii_lowercase()
    } else {
        invoker.to_ascii_uppercase()
    }
}

/// `#`: prefix the line with the comment leader and accept it.
pub(super) fn insert_comment(ed: &mut Editor) -> bool {
    let leader = ed.vars.comment_begin.clone();
    ed.buf.set_cursor(0);
    ed.buf.insert(&leader);
    ed.st.mode = Mode::Done;
    true
}
