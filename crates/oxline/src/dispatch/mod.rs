//! Dispatch: the edit state machine and the widget table.
//!
//! Decomposed by concern:
//! * `motion`  - cursor and history movement
//! * `edit`    - insertion, deletion, kills, case, transposition
//! * `vi`      - vi operators, motions and mode transitions
//! * `search`  - incremental search and the vi `/` search
//!
//! `apply` is the widget table: one match from operation tag to edit action.
//! `normal_dispatch` wraps it with repeat-count handling and vi
//! operator-motion composition; `isearch_step` runs instead while an
//! incremental search is active.

use anyhow::Result;
use tracing::{debug, trace};

use rl_events::Operation;

use crate::Editor;

mod edit;
mod motion;
pub(crate) mod search;
mod vi;

pub(crate) use search::isearch_step;

/// Editing mode of the dispatch machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Mode {
    #[default]
    Normal,
    /// Reverse incremental search.
    Search,
    ForwardSearch,
    /// Operator pending: delete / change / yank up to the next motion.
    ViDeleteTo,
    ViChangeTo,
    ViYankTo,
    Done,
    Eof,
    Interrupt,
}

impl Mode {
    pub(crate) fn is_vi_operator(self) -> bool {
        matches!(self, Mode::ViDeleteTo | Mode::ViChangeTo | Mode::ViYankTo)
    }
}

/// Last vi character search, for `;` and `,`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CharSearch {
    pub target: char,
    /// The original f/F/t/T that defined the search.
    pub invoker: char,
    /// The key that most recently ran it (`;`/`,` flip relative to this).
    pub last_invoker: char,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchState {
    pub mode: Mode,
    pub previous_mode: Mode,
    pub repeat_count: u32,
    pub is_arg_digit: bool,
    pub quoted_insert: bool,
    pub recording: bool,
    pub current_macro: String,
    pub last_macro: String,
    pub char_search: Option<CharSearch>,
    /// The vi unnamed register (`d`/`y` write it, `p` reads it).
    pub yank_buffer: String,
    /// LIFO of code points to re-read before the port.
    pub push_back: Vec<char>,
    /// Span of the last yank insertion, for yank-pop replacement.
    pub last_yank_span: Option<(usize, usize)>,
}

/// Per-read search session state.
#[derive(Debug, Default)]
pub(crate) struct Session {
    /// Line saved when isearch began, restored on abort.
    pub original_buffer: Option<String>,
    pub search_term: String,
    pub search_index: Option<usize>,
    pub previous_search_term: String,
    /// Direction of the last vi `/`/`?` search (backward = true).
    pub vi_search_backward: bool,
}

/// One step of normal-mode dispatch for a decoded operation.
pub(crate) fn normal_dispatch(ed: &mut Editor, op: Operation, seq: &str) -> Result<()> {
    let count = if ed.st.repeat_count == 0 {
        1
    } else {
        ed.st.repeat_count as usize
    };
    ed.st.is_arg_digit = false;

    // While an operator is pending only motions (and the doubled operator)
    // pass through; anything else degrades to plain movement mode.
    let op = if ed.st.mode.is_vi_operator() && !op.is_vi_motion() && !is_same_operator(op, ed.st.mode)
    {
        Operation::ViMovementMode
    } else {
        op
    };

    let cursor_start = ed.buf.cursor();
    ed.st.previous_mode = ed.st.mode;
    trace!(target: "dispatch", op = ?op, count, mode = ?ed.st.mode, "apply");

    let ok = apply(ed, op, count, seq)?;
    if !ok {
        ed.beep()?;
    }

    if matches!(ed.st.mode, Mode::Done | Mode::Eof | Mode::Interrupt) {
        return Ok(());
    }

    // Complete a pending operator over the span the motion covered. The
    // doubled-operator widgets clear the mode themselves, so only a genuine
    // motion arrives here with the pending mode intact.
    if ed.st.previous_mode.is_vi_operator()
        && ed.st.mode == ed.st.previous_mode
        && !ed.st.is_arg_digit
    {
        let a = cursor_start.min(ed.buf.cursor());
        let b = cursor_start.max(ed.buf.cursor());
        match ed.st.previous_mode {
            Mode::ViDeleteTo => {
                ed.st.yank_buffer = ed.buf.delete_range(a, b);
                ed.buf.set_cursor(a);
            }
            Mode::ViChangeTo => {
                ed.st.yank_buffer = ed.buf.delete_range(a, b);
                ed.buf.set_cursor(a);
                vi::enter_insert(ed);
            }
            Mode::ViYankTo => {
                ed.st.yank_buffer = ed.buf.substring(a, b);
                ed.buf.set_cursor(a);
            }
            _ => unreachable!(),
        }
        debug!(target: "dispatch", op = ?ed.st.previous_mode, start = a, end = b, "operator_span");
        ed.st.mode = Mode::Normal;
    }

    if ed.st.mode == Mode::Normal && !ed.st.is_arg_digit {
        ed.st.repeat_count = 0;
    }
    Ok(())
}

fn is_same_operator(op: Operation, mode: Mode) -> bool {
    matches!(
        (op, mode),
        (Operation::ViDeleteTo, Mode::ViDeleteTo)
            | (Operation::ViChangeTo, Mode::ViChangeTo)
            | (Operation::ViYankTo, Mode::ViYankTo)
    )
}

/// The widget table: apply `op` to the editor. Returns success; failures
/// beep at the call site.
pub(crate) fn apply(ed: &mut Editor, op: Operation, count: usize, seq: &str) -> Result<bool> {
    use Operation::*;
    let ok = match op {
        // Motion
        BackwardChar => motion::backward_char(ed, count),
        ForwardChar => motion::forward_char(ed, count),
        BackwardWord => motion::backward_word(ed, count),
        ForwardWord => motion::forward_word(ed, count),
        BeginningOfLine => motion::beginning_of_line(ed),
        EndOfLine => motion::end_of_line(ed),

        // History
        PreviousHistory => motion::previous_history(ed),
        NextHistory => motion::next_history(ed),
        BeginningOfHistory => motion::beginning_of_history(ed),
        EndOfHistory => motion::end_of_history(ed),
        HistorySearchBackward => search::history_search_backward(ed),
        HistorySearchForward => search::history_search_forward(ed),
        ReverseSearchHistory => search::enter_isearch(ed, false),
        ForwardSearchHistory => search::enter_isearch(ed, true),

        // Deletion and killing
        BackwardDeleteChar => edit::backward_delete_char(ed, count),
        DeleteChar => edit::delete_char(ed, count),
        ExitOrDeleteChar => edit::exit_or_delete_char(ed, count),
        KillLine => edit::kill_line(ed),
        KillWholeLine => edit::kill_whole_line(ed),
        BackwardKillWord => edit::backward_kill_word(ed, count),
        KillWord => edit::kill_word(ed, count),
        UnixLineDiscard => edit::unix_line_discard(ed),
        UnixWordRubout => edit::unix_word_rubout(ed, count),

        // Yanking
        Yank => edit::yank(ed),
        YankPop => edit::yank_pop(ed),

        // Case / transposition / insertion
        UpcaseWord => edit::upcase_word(ed, count),
        DowncaseWord => edit::downcase_word(ed, count),
        CapitalizeWord => edit::capitalize_word(ed, count),
        TransposeChars => edit::transpose_chars(ed),
        SelfInsert => edit::self_insert(ed, count, seq),
        TabInsert => edit::tab_insert(ed, count),
        QuotedInsert => {
            ed.st.quoted_insert = true;
            true
        }
        OverwriteMode => {
            ed.buf.toggle_overtype();
            true
        }
        InsertCloseParen => edit::insert_close(ed, ')', '('),
        InsertCloseSquare => edit::insert_close(ed, ']', '['),
        InsertCloseCurly => edit::insert_close(ed, '}', '{'),
        PasteFromClipboard => edit::paste_from_clipboard(ed),

        // Keyboard macros
        StartKbdMacro => {
            ed.st.recording = true;
            ed.st.current_macro.clear();
            true
        }
        EndKbdMacro => end_kbd_macro(ed, seq),
        CallLastKbdMacro => call_last_kbd_macro(ed),

        // Completion
        Complete => crate::complete::complete(ed)?,
        PossibleCompletions => crate::complete::possible_completions(ed)?,

        // Line disposition
        AcceptLine => {
            ed.st.mode = Mode::Done;
            true
        }
        Abort => false,
        Interrupt => {
            ed.st.mode = Mode::Interrupt;
            true
        }
        ClearScreen => clear_screen(ed)?,
        ReReadInitFile => {
            ed.reload_variables();
            true
        }

        // Key map switching
        EmacsEditingMode => ed.set_keymap("emacs"),
        ViEditingMode => ed.set_keymap("vi-insert"),
        DoLowercaseVersion => false,

        // vi family
        ViDeleteTo => vi::delete_to(ed),
        ViChangeTo => vi::change_to(ed),
        ViYankTo => vi::yank_to(ed),
        ViDeleteToEol => vi::delete_to_eol(ed),
        ViChangeToEol => vi::change_to_eol(ed),
        ViPut => vi::put(ed, count, seq),
        ViMatch => vi::match_bracket(ed),
        ViChangeChar => vi::change_char(ed, count)?,
        ViChangeCase => vi::change_case(ed, count),
        ViRubout => vi::rubout(ed, count),
        ViDelete => vi::delete_under(ed, count),
        ViPrevWord => vi::prev_word(ed, count),
        ViNextWord => vi::next_word(ed, count),
        ViEndWord => vi::end_word(ed, count),
        ViFirstPrint => vi::first_print(ed),
        ViColumn => vi::column(ed, count),
        ViGotoMark => false,
        ViSearch => search::vi_search(ed, seq)?,
        ViCharSearch => vi::char_search(ed, count, seq)?,
        ViKillWholeLine => vi::kill_whole_line(ed),
        ViInsertComment => vi::insert_comment(ed),

        ViInsertionMode => {
            vi::enter_insert(ed);
            true
        }
        ViInsertBeg => {
            ed.buf.set_cursor(0);
            vi::enter_insert(ed);
            true
        }
        ViAppendMode => {
            ed.buf.move_cursor(1);
            vi::enter_insert(ed);
            true
        }
        ViAppendEol => {
            let end = ed.buf.len();
            ed.buf.set_cursor(end);
            vi::enter_insert(ed);
            true
        }
        ViMovementMode => vi::movement_mode(ed),
        ViMoveAcceptLine => {
            ed.st.mode = Mode::Done;
            true
        }
        ViPreviousHistory => vi::previous_history(ed),
        ViNextHistory => vi::next_history(ed),
        ViBeginningOfLineOrArgDigit => vi::beginning_of_line_or_arg_digit(ed),
        ViArgDigit => vi::arg_digit(ed, seq),
        ViEofMaybe => vi::eof_maybe(ed, count),
    };
    Ok(ok)
}

fn end_kbd_macro(ed: &mut Editor, seq: &str) -> bool {
    if !ed.st.recording {
        return false;
    }
    ed.st.recording = false;
    // The keys that invoked this widget were recorded too; strip them.
    let macro_len = ed.st.current_macro.chars().count();
    let keep = macro_len.saturating_sub(seq.chars().count());
    ed.st.last_macro = ed.st.current_macro.chars().take(keep).collect();
    ed.st.current_macro.clear();
    true
}

fn call_last_kbd_macro(ed: &mut Editor) -> bool {
    if ed.st.last_macro.is_empty() {
        return false;
    }
    let replay = ed.st.last_macro.clone();
    for ch in replay.chars().rev() {
        ed.st.push_back.push(ch);
    }
    true
}

fn clear_screen(ed: &mut Editor) -> Result<bool> {
    use rl_terminal::Capability;
    ed.port.put(Capability::ClearScreen)?;
    ed.redisplay.invalidate();
    Ok(true)
}
