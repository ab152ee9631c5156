//! rl-events: the closed vocabulary of editing operations.
//!
//! Every key sequence ultimately resolves to one of these tags (or to a
//! macro / user widget, which live in `rl-keymap`). The dispatcher indexes
//! its widget table by this enum, so the set is closed on purpose: adding a
//! behavior means adding a variant here and a match arm there.
//!
//! Classification helpers (`is_kill`, `is_yank`, `is_vi_motion`) exist so the
//! dispatcher can do kill-ring bookkeeping and vi operator filtering without
//! open-coded variant lists at each call site.

/// Operation tags bindable in a key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Cursor motion
    BackwardChar,
    ForwardChar,
    BackwardWord,
    ForwardWord,
    BeginningOfLine,
    EndOfLine,

    // History recall
    PreviousHistory,
    NextHistory,
    BeginningOfHistory,
    EndOfHistory,
    HistorySearchBackward,
    HistorySearchForward,
    ReverseSearchHistory,
    ForwardSearchHistory,

    // Deletion and killing
    BackwardDeleteChar,
    DeleteChar,
    ExitOrDeleteChar,
    KillLine,
    KillWholeLine,
    BackwardKillWord,
    KillWord,
    UnixLineDiscard,
    UnixWordRubout,

    // Yanking
    Yank,
    YankPop,

    // Case and transposition
    UpcaseWord,
    DowncaseWord,
    CapitalizeWord,
    TransposeChars,

    // Insertion
    SelfInsert,
    TabInsert,
    QuotedInsert,
    OverwriteMode,
    InsertCloseParen,
    InsertCloseSquare,
    InsertCloseCurly,
    PasteFromClipboard,

    // Keyboard macros
    StartKbdMacro,
    EndKbdMacro,
    CallLastKbdMacro,

    // Completion
    Complete,
    PossibleCompletions,

    // Line disposition
    AcceptLine,
    Abort,
    Interrupt,
    ClearScreen,
    ReReadInitFile,

    // Key map switching
    EmacsEditingMode,
    ViEditingMode,

    // Decoder directive: retry the lookup with the last code point lowercased.
    DoLowercaseVersion,

    // vi operators and motions
    ViDeleteTo,
    ViChangeTo,
    ViYankTo,
    ViDeleteToEol,
    ViChangeToEol,
    ViPut,
    ViMatch,
    ViChangeChar,
    ViChangeCase,
    ViRubout,
    ViDelete,
    ViPrevWord,
    ViNextWord,
    ViEndWord,
    ViFirstPrint,
    ViColumn,
    ViGotoMark,
    ViSearch,
    ViCharSearch,
    ViKillWholeLine,
    ViInsertComment,

    // vi mode transitions
    ViInsertionMode,
    ViInsertBeg,
    ViAppendMode,
    ViAppendEol,
    ViMovementMode,
    ViMoveAcceptLine,
    ViPreviousHistory,
    ViNextHistory,
    ViBeginningOfLineOrArgDigit,
    ViArgDigit,
    ViEofMaybe,
}

impl Operation {
    /// Operations that push text into the kill ring. Two of these in a row
    /// coalesce into a single ring slot.
    pub fn is_kill(self) -> bool {
        matches!(
            self,
            Operation::KillLine
                | Operation::KillWholeLine
                | Operation::BackwardKillWord
                | Operation::KillWord
                | Operation::UnixLineDiscard
                | Operation::UnixWordRubout
        )
    }

    /// Operations that read from the kill ring. Anything else between a yank
    /// and a yank-pop invalidates the pop.
    pub fn is_yank(self) -> bool {
        matches!(self, Operation::Yank | Operation::YankPop)
    }

    /// Motions permitted to complete a pending vi operator (`d`/`c`/`y`).
    /// The same-letter doubled operator (`dd`, `cc`, `yy`) is handled by the
    /// operator widgets themselves and is not part of this set.
    pub fn is_vi_motion(self) -> bool {
        matches!(
            self,
            Operation::BackwardChar
                | Operation::ForwardChar
                | Operation::EndOfLine
                | Operation::ViMatch
                | Operation::ViBeginningOfLineOrArgDigit
                | Operation::ViArgDigit
                | Operation::ViPrevWord
                | Operation::ViNextWord
                | Operation::ViEndWord
                | Operation::ViCharSearch
                | Operation::ViFirstPrint
                | Operation::ViGotoMark
                | Operation::ViColumn
        )
    }
}
