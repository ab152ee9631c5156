//! History search: the incremental search sub-machine, prefix search, and
//! the vi `/` `?` line search.
//!
//! While isearch is active the decoder keeps running against the normal key
//! map, but decoded operations come here instead of the widget table. Typed
//! text narrows the query, C-r / C-s step through matches, backspace widens,
//! C-g restores the original line, and any other operation commits the match
//! (re-processing only an accept). The status renders as a post line
//! `bck-i-search: term_` under the edit line.

use anyhow::Result;
use tracing::debug;

use rl_events::Operation;

use super::{Mode, motion, normal_dispatch};
use crate::Editor;

/// Enter incremental search from normal dispatch (C-r / C-s widgets).
pub(super) fn enter_isearch(ed: &mut Editor, forward: bool) -> bool {
    ed.session.original_buffer = Some(ed.buf.to_line());
    ed.session.search_term.clear();
    ed.session.search_index = None;
    ed.st.mode = if forward {
        Mode::ForwardSearch
    } else {
        Mode::Search
    };
    update_status(ed);
    true
}

fn exit_isearch(ed: &mut Editor) {
    ed.session.original_buffer = None;
    ed.session.search_term.clear();
    ed.session.search_index = None;
    ed.post.clear();
    if ed.st.mode == Mode::Search || ed.st.mode == Mode::ForwardSearch {
        ed.st.mode = Mode::Normal;
    }
}

fn update_status(ed: &mut Editor) {
    let label = if ed.st.mode == Mode::ForwardSearch {
        "i-search"
    } else {
        "bck-i-search"
    };
    ed.post = vec![format!("{label}: {}_", ed.session.search_term)];
}

/// Run the term against history. `from_scratch` searches the whole store;
/// otherwise the scan starts just past the current match.
fn run_search(ed: &mut Editor, from_scratch: bool) -> bool {
    let forward = ed.st.mode == Mode::ForwardSearch;
    let term = ed.session.search_term.clone();
    let found = if forward {
        let from = if from_scratch {
            0
        } else {
            ed.session.search_index.map(|i| i + 1).unwrap_or(0)
        };
        ed.history.search_forward(&term, from)
    } else {
        let before = if from_scratch {
            ed.history.index()
        } else {
            ed.session.search_index.unwrap_or(ed.history.index())
        };
        ed.history.search_backward(&term, before)
    };
    match found {
        Some(i) => {
            ed.session.search_index = Some(i);
            let text = ed.history.get(i).unwrap_or("").to_string();
            ed.buf.replace_with(&text);
            true
        }
        None => false,
    }
}

/// One isearch transition for a decoded operation.
pub(crate) fn isearch_step(ed: &mut Editor, op: Operation, seq: &str) -> Result<()> {
    match op {
        Operation::Abort => {
            if let Some(original) = ed.session.original_buffer.take() {
                ed.buf.replace_with(&original);
            }
            exit_isearch(ed);
            return Ok(());
        }
        Operation::ReverseSearchHistory | Operation::ForwardSearchHistory => {
            ed.st.mode = if op == Operation::ForwardSearchHistory {
                Mode::ForwardSearch
            } else {
                Mode::Search
            };
            let ok = if ed.session.search_term.is_empty() {
                ed.session.search_term = ed.session.previous_search_term.clone();
                run_search(ed, true)
            } else {
                run_search(ed, false)
            };
            if !ok {
                ed.beep()?;
            }
        }
        Operation::BackwardDeleteChar => {
            ed.session.search_term.pop();
            if ed.session.search_term.is_empty() {
                ed.session.search_index = None;
            } else if !run_search(ed, true) {
                ed.beep()?;
            }
        }
        Operation::SelfInsert => {
            ed.session.search_term.push_str(seq);
            // Re-scan inclusively so the current match survives narrowing.
            let prior = ed.session.search_index;
            let term = ed.session.search_term.clone();
            let found = if ed.st.mode == Mode::ForwardSearch {
                ed.history.search_forward(&term, prior.unwrap_or(0))
            } else {
                let before = prior.map(|i| i + 1).unwrap_or(ed.history.index());
                ed.history.search_backward(&term, before)
            };
            match found {
                Some(i) => {
                    ed.session.search_index = Some(i);
                    let text = ed.history.get(i).unwrap_or("").to_string();
                    ed.buf.replace_with(&text);
                }
                None => ed.beep()?,
            }
        }
        other => {
            // Commit: remember the term, park the history cursor on the
            // match, and let only an accept continue as a normal operation.
            ed.session.previous_search_term = ed.session.search_term.clone();
            let index = ed.session.search_index;
            if let Some(i) = index {
                ed.history.move_to(i);
            }
            exit_isearch(ed);
            debug!(target: "dispatch", op = ?other, index = ?index, "isearch_commit");
            if matches!(other, Operation::AcceptLine | Operation::ViMoveAcceptLine) {
                normal_dispatch(ed, other, seq)?;
            }
            return Ok(());
        }
    }
    update_status(ed);
    Ok(())
}

// ----------------------------------------------------------------------
// Non-incremental prefix search (history-search-backward/forward)
// ----------------------------------------------------------------------

pub(super) fn history_search_backward(ed: &mut Editor) -> bool {
    let prefix = ed.buf.up_to_cursor();
    let cursor_at = ed.buf.cursor();
    let Some(i) = ed.history.search_prefix_backward(&prefix, ed.history.cursor()) else {
        return false;
    };
    ed.history.move_to(i);
    motion::recall_current(ed);
    ed.buf.set_cursor(cursor_at);
    true
}

pub(super) fn history_search_forward(ed: &mut Editor) -> bool {
    let prefix = ed.buf.up_to_cursor();
    let cursor_at = ed.buf.cursor();
    let Some(i) = ed
        .history
        .search_prefix_forward(&prefix, ed.history.cursor() + 1)
    else {
        return false;
    };
    ed.history.move_to(i);
    motion::recall_current(ed);
    ed.buf.set_cursor(cursor_at);
    true
}

// ----------------------------------------------------------------------
// vi `/` `?` search and `n` / `N` repeats
// ----------------------------------------------------------------------

/// The vi search line: the buffer is temporarily replaced by `/term` while
/// the user types; ENTER searches, ESC restores.
pub(super) fn vi_search(ed: &mut Editor, seq: &str) -> Result<bool> {
    let invoker = seq.chars().last().unwrap_or('/');
    match invoker {
        '/' | '?' => {
            let backward = invoker == '/';
            let saved = ed.buf.to_line();
            let saved_cursor = ed.buf.cursor();
            ed.buf.replace_with(&invoker.to_string());
            let term = loop {
                ed.redisplay_now()?;
                ed.port.flush()?;
                let Some(ch) = ed.read_raw_char()? else {
                    break None;
                };
                match ch {
                    '\r' | '\n' => {
                        let line = ed.buf.to_line();
                        break Some(line.chars().skip(1).collect::<String>());
                    }
                    '\u{1b}' => break None,
                    '\u{7f}' | '\u{8}' => {
                        ed.buf.backspace(1);
                        if ed.buf.is_empty() {
                            break None;
                        }
                    }
                    c if (c as u32) >= 0x20 => ed.buf.insert_char(c),
                    _ => {}
                }
            };
            let Some(term) = term else {
                ed.buf.replace_with(&saved);
                ed.buf.set_cursor(saved_cursor);
                return Ok(true);
            };
            ed.buf.replace_with(&saved);
            ed.buf.set_cursor(saved_cursor);
            if term.is_empty() {
                return Ok(false);
            }
            ed.session.previous_search_term = term;
            ed.session.vi_search_backward = backward;
            Ok(vi_search_step(ed, backward))
        }
        'n' => Ok(vi_search_step(ed, ed.session.vi_search_backward)),
        'N' => Ok(vi_search_step(ed, !ed.session.vi_search_backward)),
        _ => Ok(false),
    }
}

fn vi_search_step(ed: &mut Editor, backward: bool) -> bool {
    let term = ed.session.previous_search_term.clone();
    if term.is_empty() {
        return false;
    }
    let found = if backward {
        ed.history.search_backward(&term, ed.history.cursor())
    } else {
        ed.history.search_forward(&term, ed.history.cursor() + 1)
    };
    let Some(i) = found else {
        return false;
    };
    ed.history.move_to(i);
    motion::recall_current(ed);
    ed.buf.set_cursor(0);
    true
}
