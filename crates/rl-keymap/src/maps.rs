//! Shipped key maps: emacs, vi-insert, vi-move.
//!
//! Sequences follow the readline defaults. Arrow, home/end, delete and
//! insert keys are bound through their CSI (`ESC [`) and SS3 (`ESC O`)
//! encodings, which is also what the console port re-encodes structured key
//! events into.

use crate::{Binding, KeyMap, Operation};

pub const ESC: char = '\u{1b}';
pub const DEL: char = '\u{7f}';

/// Control code point for a letter: `ctrl('a')` is 0x01.
pub const fn ctrl(ch: char) -> char {
    ((ch as u8) & 0x1f) as char
}

fn c(ch: char) -> String {
    ctrl(ch).to_string()
}

fn esc(seq: &str) -> String {
    format!("{ESC}{seq}")
}

/// Bind the cursor-key sequences shared by every map.
fn bind_arrow_keys<W>(map: &mut KeyMap<W>) {
    for prefix in ["[", "O"] {
        map.bind(&esc(&format!("{prefix}A")), Binding::Op(Operation::PreviousHistory));
        map.bind(&esc(&format!("{prefix}B")), Binding::Op(Operation::NextHistory));
        map.bind(&esc(&format!("{prefix}C")), Binding::Op(Operation::ForwardChar));
        map.bind(&esc(&format!("{prefix}D")), Binding::Op(Operation::BackwardChar));
        map.bind(&esc(&format!("{prefix}H")), Binding::Op(Operation::BeginningOfLine));
        map.bind(&esc(&format!("{prefix}F")), Binding::Op(Operation::EndOfLine));
    }
    map.bind(&esc("[1~"), Binding::Op(Operation::BeginningOfLine));
    map.bind(&esc("[2~"), Binding::Op(Operation::OverwriteMode));
    map.bind(&esc("[3~"), Binding::Op(Operation::DeleteChar));
    map.bind(&esc("[4~"), Binding::Op(Operation::EndOfLine));
}

/// The default emacs map. Unbound code points self-insert.
pub fn emacs<W>() -> KeyMap<W> {
    let mut map = KeyMap::new("emacs");
    map.set_other_key(Binding::Op(Operation::SelfInsert));

    map.bind(&c('a'), Binding::Op(Operation::BeginningOfLine));
    map.bind(&c('b'), Binding::Op(Operation::BackwardChar));
    map.bind(&c('c'), Binding::Op(Operation::Interrupt));
    map.bind(&c('d'), Binding::Op(Operation::ExitOrDeleteChar));
    map.bind(&c('e'), Binding::Op(Operation::EndOfLine));
    map.bind(&c('f'), Binding::Op(Operation::ForwardChar));
    map.bind(&c('g'), Binding::Op(Operation::Abort));
    map.bind(&c('h'), Binding::Op(Operation::BackwardDeleteChar));
    map.bind("\t", Binding::Op(Operation::Complete));
    map.bind("\n", Binding::Op(Operation::AcceptLine));
    map.bind(&c('k'), Binding::Op(Operation::KillLine));
    map.bind(&c('l'), Binding::Op(Operation::ClearScreen));
    map.bind("\r", Binding::Op(Operation::AcceptLine));
    map.bind(&c('n'), Binding::Op(Operation::NextHistory));
    map.bind(&c('p'), Binding::Op(Operation::PreviousHistory));
    map.bind(&c('r'), Binding::Op(Operation::ReverseSearchHistory));
    map.bind(&c('s'), Binding::Op(Operation::ForwardSearchHistory));
    map.bind(&c('t'), Binding::Op(Operation::TransposeChars));
    map.bind(&c('u'), Binding::Op(Operation::UnixLineDiscard));
    map.bind(&c('v'), Binding::Op(Operation::QuotedInsert));
    map.bind(&c('w'), Binding::Op(Operation::UnixWordRubout));
    map.bind(&c('y'), Binding::Op(Operation::Yank));
    map.bind(&DEL.to_string(), Binding::Op(Operation::BackwardDeleteChar));

    // C-x extended commands: keyboard macros and init-file reload.
    map.bind(&format!("{}(", ctrl('x')), Binding::Op(Operation::StartKbdMacro));
    map.bind(&format!("{})", ctrl('x')), Binding::Op(Operation::EndKbdMacro));
    map.bind(&format!("{}e", ctrl('x')), Binding::Op(Operation::CallLastKbdMacro));
    map.bind(
        &format!("{}{}", ctrl('x'), ctrl('r')),
        Binding::Op(Operation::ReReadInitFile),
    );

    // Meta keys.
    map.bind(&esc("b"), Binding::Op(Operation::BackwardWord));
    map.bind(&esc("c"), Binding::Op(Operation::CapitalizeWord));
    map.bind(&esc("d"), Binding::Op(Operation::KillWord));
    map.bind(&esc("f"), Binding::Op(Operation::ForwardWord));
    map.bind(&esc("l"), Binding::Op(Operation::DowncaseWord));
    map.bind(&esc("n"), Binding::Op(Operation::HistorySearchForward));
    map.bind(&esc("p"), Binding::Op(Operation::HistorySearchBackward));
    map.bind(&esc("u"), Binding::Op(Operation::UpcaseWord));
    map.bind(&esc("y"), Binding::Op(Operation::YankPop));
    map.bind(&esc("\t"), Binding::Op(Operation::TabInsert));
    map.bind(&esc("<"), Binding::Op(Operation::BeginningOfHistory));
    map.bind(&esc(">"), Binding::Op(Operation::EndOfHistory));
    map.bind(&esc("?"), Binding::Op(Operation::PossibleCompletions));
    map.bind(&esc(&DEL.to_string()), Binding::Op(Operation::BackwardKillWord));
    map.bind(&esc(&c('h')), Binding::Op(Operation::BackwardKillWord));
    map.bind(&esc(&ESC.to_string()), Binding::Op(Operation::Abort));
    for ch in 'A'..='Z' {
        map.bind(&esc(&ch.to_string()), Binding::Op(Operation::DoLowercaseVersion));
    }

    bind_arrow_keys(&mut map);
    map
}

/// The vi insertion map. Unbound code points self-insert; ESC leaves for
/// vi-move, which is expressed as the ESC sub-map's default so that cursor
/// key sequences still resolve.
pub fn vi_insert<W>() -> KeyMap<W> {
    let mut map = KeyMap::new("vi-insert");
    map.set_other_key(Binding::Op(Operation::SelfInsert));

    map.bind(&c('c'), Binding::Op(Operation::Interrupt));
    map.bind(&c('d'), Binding::Op(Operation::ViEofMaybe));
    map.bind(&c('h'), Binding::Op(Operation::BackwardDeleteChar));
    map.bind("\t", Binding::Op(Operation::Complete));
    map.bind("\n", Binding::Op(Operation::AcceptLine));
    map.bind("\r", Binding::Op(Operation::AcceptLine));
    map.bind(&c('l'), Binding::Op(Operation::ClearScreen));
    map.bind(&c('r'), Binding::Op(Operation::ReverseSearchHistory));
    map.bind(&c('u'), Binding::Op(Operation::UnixLineDiscard));
    map.bind(&c('v'), Binding::Op(Operation::QuotedInsert));
    map.bind(&c('w'), Binding::Op(Operation::UnixWordRubout));
    map.bind(&c('y'), Binding::Op(Operation::Yank));
    map.bind(&DEL.to_string(), Binding::Op(Operation::BackwardDeleteChar));

    bind_arrow_keys(&mut map);
    if let Some(Binding::Map(sub)) = map.get_mut_char(ESC) {
        sub.set_other_key(Binding::Op(Operation::ViMovementMode));
    }
    map
}

/// The vi movement (command) map. Unbound code points beep.
pub fn vi_move<W>() -> KeyMap<W> {
    let mut map = KeyMap::new("vi-move");

    map.bind("0", Binding::Op(Operation::ViBeginningOfLineOrArgDigit));
    for d in '1'..='9' {
        map.bind(&d.to_string(), Binding::Op(Operation::ViArgDigit));
    }

    map.bind("^", Binding::Op(Operation::ViFirstPrint));
    map.bind("$", Binding::Op(Operation::EndOfLine));
    map.bind(" ", Binding::Op(Operation::ForwardChar));
    map.bind("h", Binding::Op(Operation::BackwardChar));
    map.bind("l", Binding::Op(Operation::ForwardChar));
    map.bind(&c('h'), Binding::Op(Operation::BackwardChar));
    map.bind(&DEL.to_string(), Binding::Op(Operation::BackwardChar));
    map.bind("|", Binding::Op(Operation::ViColumn));
    map.bind("%", Binding::Op(Operation::ViMatch));

    map.bind("w", Binding::Op(Operation::ViNextWord));
    map.bind("W", Binding::Op(Operation::ViNextWord));
    map.bind("b", Binding::Op(Operation::ViPrevWord));
    map.bind("B", Binding::Op(Operation::ViPrevWord));
    map.bind("e", Binding::Op(Operation::ViEndWord));
    map.bind("E", Binding::Op(Operation::ViEndWord));

    for chr in ["f", "F", "t", "T", ";", ","] {
        map.bind(chr, Binding::Op(Operation::ViCharSearch));
    }

    map.bind("j", Binding::Op(Operation::NextHistory));
    map.bind("k", Binding::Op(Operation::PreviousHistory));
    map.bind("+", Binding::Op(Operation::ViNextHistory));
    map.bind("-", Binding::Op(Operation::ViPreviousHistory));
    map.bind("G", Binding::Op(Operation::EndOfHistory));
    for chr in ["/", "?", "n", "N"] {
        map.bind(chr, Binding::Op(Operation::ViSearch));
    }

    map.bind("i", Binding::Op(Operation::ViInsertionMode));
    map.bind("I", Binding::Op(Operation::ViInsertBeg));
    map.bind("a", Binding::Op(Operation::ViAppendMode));
    map.bind("A", Binding::Op(Operation::ViAppendEol));

    map.bind("d", Binding::Op(Operation::ViDeleteTo));
    map.bind("D", Binding::Op(Operation::ViDeleteToEol));
    map.bind("c", Binding::Op(Operation::ViChangeTo));
    map.bind("C", Binding::Op(Operation::ViChangeToEol));
    map.bind("y", Binding::Op(Operation::ViYankTo));
    map.bind("Y", Binding::Op(Operation::ViYankTo));
    map.bind("p", Binding::Op(Operation::ViPut));
    map.bind("P", Binding::Op(Operation::ViPut));
    map.bind("x", Binding::Op(Operation::ViDelete));
    map.bind("X", Binding::Op(Operation::ViRubout));
    map.bind("r", Binding::Op(Operation::ViChangeChar));
    map.bind("~", Binding::Op(Operation::ViChangeCase));
    map.bind("S", Binding::Op(Operation::ViKillWholeLine));
    map.bind("#", Binding::Op(Operation::ViInsertComment));

    map.bind(&c('c'), Binding::Op(Operation::Interrupt));
    map.bind(&c('d'), Binding::Op(Operation::ViEofMaybe));
    map.bind(&c('l'), Binding::Op(Operation::ClearScreen));
    map.bind("\n", Binding::Op(Operation::ViMoveAcceptLine));
    map.bind("\r", Binding::Op(Operation::ViMoveAcceptLine));
    map.bind(&c('e'), Binding::Op(Operation::EmacsEditingMode));

    bind_arrow_keys(&mut map);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolved<W>(map: &KeyMap<W>, seq: &str) -> Option<Operation> {
        match map.get(seq) {
            Some(Binding::Op(o)) => Some(*o),
            _ => None,
        }
    }

    #[test]
    fn emacs_defaults() {
        let m: KeyMap<()> = emacs();
        assert_eq!(m.name(), "emacs");
        assert_eq!(resolved(&m, "\u{1}"), Some(Operation::BeginningOfLine));
        assert_eq!(resolved(&m, "\u{12}"), Some(Operation::ReverseSearchHistory));
        assert_eq!(resolved(&m, "\u{19}"), Some(Operation::Yank));
        assert_eq!(resolved(&m, "\u{1b}y"), Some(Operation::YankPop));
        assert_eq!(resolved(&m, "\u{1b}[A"), Some(Operation::PreviousHistory));
        assert_eq!(resolved(&m, "\u{18}("), Some(Operation::StartKbdMacro));
        assert!(matches!(
            m.other_key(),
            Some(Binding::Op(Operation::SelfInsert))
        ));
    }

    #[test]
    fn emacs_meta_uppercase_lowers() {
        let m: KeyMap<()> = emacs();
        assert_eq!(resolved(&m, "\u{1b}U"), Some(Operation::DoLowercaseVersion));
        assert_eq!(resolved(&m, "\u{1b}u"), Some(Operation::UpcaseWord));
    }

    #[test]
    fn vi_insert_esc_submap_defaults_to_movement_mode() {
        let m: KeyMap<()> = vi_insert();
        match m.get("\u{1b}") {
            Some(Binding::Map(sub)) => {
                assert!(matches!(
                    sub.other_key(),
                    Some(Binding::Op(Operation::ViMovementMode))
                ));
            }
            other => panic!("ESC should be a sub-map, got {other:?}"),
        }
        assert_eq!(resolved(&m, "\u{1b}[A"), Some(Operation::PreviousHistory));
    }

    #[test]
    fn vi_move_operators_and_motions() {
        let m: KeyMap<()> = vi_move();
        assert_eq!(resolved(&m, "d"), Some(Operation::ViDeleteTo));
        assert_eq!(resolved(&m, "c"), Some(Operation::ViChangeTo));
        assert_eq!(resolved(&m, "w"), Some(Operation::ViNextWord));
        assert_eq!(resolved(&m, "0"), Some(Operation::ViBeginningOfLineOrArgDigit));
        assert_eq!(resolved(&m, "5"), Some(Operation::ViArgDigit));
        assert_eq!(resolved(&m, "f"), Some(Operation::ViCharSearch));
        assert!(m.get("q").is_none());
        assert!(m.other_key().is_none());
    }
}
