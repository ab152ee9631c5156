//! History recall, incremental search and event expansion end to end.

mod common;

use common::*;

#[test]
fn arrow_up_recalls_previous_entry() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed(&format!("{ESC}[A\r"));
    });
    ed.history_mut().add("first");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "first");
}

#[test]
fn recall_walks_back_and_forward() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("\u{10}\u{10}\u{e}\r"); // C-p C-p C-n
    });
    ed.history_mut().add("one");
    ed.history_mut().add("two");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "two");
}

#[test]
fn event_expansion_bang_bang() {
    let (mut ed, console) = editor_with_script(|c| {
        c.feed("!!\r");
    });
    ed.history_mut().add("echo foo");
    let line = ed.read_line_prompt("> ").unwrap();
    assert_eq!(line, "echo foo");
    // The expanded line is printed before returning.
    assert!(console.transcript().contains("echo foo"));
    // And the expansion, not the designator, lands in history.
    assert_eq!(ed.history().get(ed.history().index() - 1), Some("echo foo"));
}

#[test]
fn event_expansion_last_word() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("rm !$\r");
    });
    ed.history_mut().add("cp a.txt b.txt");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "rm b.txt");
}

#[test]
fn quick_substitution() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("^foo^bar^\r");
    });
    ed.history_mut().add("echo foo");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "echo bar");
}

#[test]
fn failed_expansion_beeps_and_returns_empty() {
    let (mut ed, console) = editor_with_script(|c| {
        c.feed("!nosuch\r");
    });
    let line = ed.read_line_prompt("> ").unwrap();
    assert_eq!(line, "");
    assert!(console.transcript().contains(BELL));
    assert_eq!(ed.history().size(), 0);
}

#[test]
fn expansion_disabled_by_variable() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("!!\r");
    });
    ed.history_mut().add("echo foo");
    ed.variables_mut()
        .set("disable-event-expansion", "on")
        .unwrap();
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "!!");
}

#[test]
fn incremental_search_narrows_and_accepts() {
    let (mut ed, console) = editor_with_script(|c| {
        c.feed(&format!("{CTRL_R}b"));
        c.feed(&format!("{CTRL_R}")); // no earlier match: beep
        c.feed("\r");
    });
    for l in ["alpha", "beta", "gamma"] {
        ed.history_mut().add(l);
    }
    let line = ed.read_line_prompt("> ").unwrap();
    assert_eq!(line, "beta");
    let t = console.transcript();
    assert!(t.contains("bck-i-search: b_"), "transcript: {t:?}");
    assert!(t.contains(BELL), "expected a beep in {t:?}");
}

#[test]
fn isearch_abort_restores_original_line() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("typed");
        c.feed(&format!("{CTRL_R}al"));
        c.feed("\u{7}"); // C-g aborts
        c.feed("\r");
    });
    for l in ["alpha", "beta"] {
        ed.history_mut().add(l);
    }
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "typed");
}

#[test]
fn isearch_backspace_widens() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed(&format!("{CTRL_R}gx{DEL}\r"));
    });
    for l in ["alpha", "gamma"] {
        ed.history_mut().add(l);
    }
    // "gx" matches nothing; deleting the x re-finds "gamma".
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "gamma");
}

#[test]
fn isearch_commit_with_motion_discards_the_motion() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed(&format!("{CTRL_R}bet"));
        c.feed("\u{1}"); // C-a commits and is discarded
        c.feed("X\r");
    });
    for l in ["alpha", "beta"] {
        ed.history_mut().add(l);
    }
    // The committed buffer is "beta"; X lands wherever the cursor was left,
    // proving the C-a itself did not run.
    let line = ed.read_line_prompt("> ").unwrap();
    assert_eq!(line, "betaX");
}

#[test]
fn prefix_search_matches_start_of_entry() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("git");
        c.feed(&format!("{ESC}p")); // history-search-backward
        c.feed("\r");
    });
    ed.history_mut().add("git push");
    ed.history_mut().add("ls");
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "git push");
}

#[test]
fn vi_slash_search_recalls_match() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed(&ESC.to_string());
        c.pause();
        c.feed("/beta\r");
        c.feed("\r");
    });
    ed.set_keymap("vi-insert");
    for l in ["alpha", "beta", "gamma"] {
        ed.history_mut().add(l);
    }
    assert_eq!(ed.read_line_prompt("> ").unwrap(), "beta");
}

#[test]
fn history_capacity_drops_oldest() {
    let (mut ed, _) = editor_with_script(|c| {
        c.feed("\r");
    });
    let mut h = oxline::History::new(2);
    h.add("a");
    h.add("b");
    h.add("c");
    let old = ed.set_history(h);
    assert_eq!(old.size(), 0);
    let _ = ed.read_line_prompt("> ").unwrap();
    assert_eq!(ed.history().size(), 2);
    assert_eq!(ed.history().get(1), Some("b"));
    assert_eq!(ed.history().get(2), Some("c"));
}
