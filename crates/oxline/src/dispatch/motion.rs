//! Cursor and history movement widgets.

use rl_text::motion;

use crate::Editor;

pub(super) fn backward_char(ed: &mut Editor, count: usize) -> bool {
    ed.buf.move_cursor(-(count as isize)) != 0
}

pub(super) fn forward_char(ed: &mut Editor, count: usize) -> bool {
    ed.buf.move_cursor(count as isize) != 0
}

pub(super) fn backward_word(ed: &mut Editor, count: usize) -> bool {
    let from = ed.buf.cursor();
    let to = motion::backward_word(ed.buf.chars(), from, count);
    ed.buf.set_cursor(to);
    to != from
}

pub(super) fn forward_word(ed: &mut Editor, count: usize) -> bool {
    let from = ed.buf.cursor();
    let to = motion::forward_word(ed.buf.chars(), from, count);
    ed.buf.set_cursor(to);
    to != from
}

pub(super) fn beginning_of_line(ed: &mut Editor) -> bool {
    ed.buf.set_cursor(0);
    true
}

pub(super) fn end_of_line(ed: &mut Editor) -> bool {
    let end = ed.buf.len();
    ed.buf.set_cursor(end);
    true
}

/// Recall the entry under the history cursor into the edit buffer.
pub(super) fn recall_current(ed: &mut Editor) {
    let text = ed.history.current().to_string();
    ed.buf.replace_with(&text);
}

pub(super) fn previous_history(ed: &mut Editor) -> bool {
    if !ed.history.previous() {
        return false;
    }
    recall_current(ed);
    true
}

pub(super) fn next_history(ed: &mut Editor) -> bool {
    if !ed.history.next() {
        return false;
    }
    recall_current(ed);
    true
}

pub(super) fn beginning_of_history(ed: &mut Editor) -> bool {
    if !ed.history.move_to_first() {
        return false;
    }
    recall_current(ed);
    true
}

pub(super) fn end_of_history(ed: &mut Editor) -> bool {
    ed.history.move_to_end();
    recall_current(ed);
    true
}
