//! vi-map editing: mode transitions, operators, char search, ESC timing.

mod common;

use common::*;

fn vi_editor(script: impl FnOnce(&mut rl_terminal::ScriptedConsole)) -> oxline::Editor {
    let (mut ed, _) = editor_with_script(script);
    ed.set_keymap("vi-insert");
    ed
}

#[test]
fn change_word_replaces_word_only() {
    // ESC to vi-move from insert, then `cw` on "hello world" at column 0,
    // type the replacement, ESC back to move, accept.
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("cwHI");
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("\r");
    });
    let line = ed.read_line_with("", None, "hello world").unwrap();
    assert_eq!(line, "HI world");
}

#[test]
fn dd_deletes_whole_line() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("dd\r");
    });
    assert_eq!(ed.read_line_with("", None, "some text").unwrap(), "");
}

#[test]
fn dw_then_put_restores_word() {
    // `dw` at 0 kills "one "; `P` pastes it back before the cursor.
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("dwP\r");
    });
    assert_eq!(ed.read_line_with("", None, "one two").unwrap(), "one two");
}

#[test]
fn x_deletes_under_cursor() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("x\r");
    });
    assert_eq!(ed.read_line_with("", None, "abc").unwrap(), "bc");
}

#[test]
fn repeat_count_multiplies_deletion() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("2x\r");
    });
    assert_eq!(ed.read_line_with("", None, "abcd").unwrap(), "cd");
}

#[test]
fn char_search_f_lands_on_target() {
    // `df.` deletes through the dot.
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("df.\r");
    });
    assert_eq!(ed.read_line_with("", None, "abc.def").unwrap(), "def");
}

#[test]
fn char_search_t_stops_short() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("dt.\r");
    });
    assert_eq!(ed.read_line_with("", None, "abc.def").unwrap(), ".def");
}

#[test]
fn tilde_toggles_case_and_advances() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("~~\r");
    });
    assert_eq!(ed.read_line_with("", None, "ab").unwrap(), "AB");
}

#[test]
fn replace_char() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("rX\r");
    });
    assert_eq!(ed.read_line_with("", None, "abc").unwrap(), "Xbc");
}

#[test]
fn esc_pause_then_key_is_two_bindings() {
    // Scenario: ESC alone (timeout) switches to vi-move; the following `k`
    // is then a history motion.
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("k\r");
    });
    ed.history_mut().add("earlier");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "earlier");
}

#[test]
fn esc_bracket_sequence_without_pause_is_one_binding() {
    // ESC [ A decodes as previous-history even in vi-insert.
    let mut ed = vi_editor(|c| {
        c.feed(&format!("{ESC}[A\r"));
    });
    ed.history_mut().add("earlier");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "earlier");
}

#[test]
fn vi_match_jumps_between_brackets() {
    // `d%` from the opening paren deletes the whole group.
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("d%\r");
    });
    assert_eq!(ed.read_line_with("", None, "(a(b))tail").unwrap(), "tail");
}

#[test]
fn append_at_eol() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("A!\r");
    });
    assert_eq!(ed.read_line_with("", None, "end").unwrap(), "end!");
}

#[test]
fn insert_comment_prefixes_and_accepts() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("#");
    });
    assert_eq!(ed.read_line_with("", None, "note").unwrap(), "#note");
}

#[test]
fn semicolon_repeats_char_search() {
    let mut ed = vi_editor(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        // f. to first dot, ; to the second, then delete to end of line.
        c.feed("f.;D\r");
    });
    assert_eq!(ed.read_line_with("", None, "a.b.c").unwrap(), "a.b");
}
