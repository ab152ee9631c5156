//! Terminal capability flags and the control sequences they gate.
//!
//! The renderer asks for operations (`Capability`), not byte strings; a
//! terminal that lacks a capability answers `None` and the renderer falls
//! back (overwrite instead of insert-chars, blank-fill instead of
//! delete-chars). Single-step cursor motions always exist; the parameterized
//! forms are gated so a degraded profile exercises the fallback paths.

use bitflags::bitflags;

bitflags! {
    /// Feature set advertised by a terminal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TerminalCapabilities: u16 {
        /// ICH/DCH: open or close room within a line.
        const INSERT_DELETE_CHARS = 1 << 0;
        /// Parameterized cursor motion (CSI n A et al.).
        const PARM_CURSOR         = 1 << 1;
        /// Cursor wraps to the next line at the right margin.
        const AUTO_RIGHT_MARGIN   = 1 << 2;
        /// Wrap is deferred until the next glyph (xenl).
        const EAT_NEWLINE_GLITCH  = 1 << 3;
        /// Visible bell.
        const FLASH_SCREEN        = 1 << 4;
    }
}

impl TerminalCapabilities {
    /// Profile of a VT100-descended ANSI terminal (xterm and friends).
    pub fn ansi() -> Self {
        Self::INSERT_DELETE_CHARS
            | Self::PARM_CURSOR
            | Self::AUTO_RIGHT_MARGIN
            | Self::EAT_NEWLINE_GLITCH
            | Self::FLASH_SCREEN
    }

    /// Minimal profile: overwrite-only updates, no wrap tricks.
    pub fn dumb() -> Self {
        Self::empty()
    }
}

/// A terminal operation the renderer may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CarriageReturn,
    CursorUp(u16),
    CursorLeft(u16),
    CursorRight(u16),
    ClearToEol,
    ClearScreen,
    InsertChars(u16),
    DeleteChars(u16),
    Bell,
    Flash,
}

impl Capability {
    /// The escape sequence for this operation on a terminal with `caps`,
    /// or `None` when unsupported.
    pub fn sequence(self, caps: TerminalCapabilities) -> Option<String> {
        let parm = caps.contains(TerminalCapabilities::PARM_CURSOR);
        match self {
            Capability::CarriageReturn => Some("\r".to_string()),
            Capability::CursorUp(0)
            | Capability::CursorLeft(0)
            | Capability::CursorRight(0) => Some(String::new()),
            Capability::CursorUp(n) => Some(Self::motion(n, 'A', parm)),
            Capability::CursorLeft(n) => Some(Self::motion(n, 'D', parm)),
            Capability::CursorRight(n) => Some(Self::motion(n, 'C', parm)),
            Capability::ClearToEol => Some("\u{1b}[K".to_string()),
            Capability::ClearScreen => Some("\u{1b}[H\u{1b}[2J".to_string()),
            Capability::InsertChars(n) => caps
                .contains(TerminalCapabilities::INSERT_DELETE_CHARS)
                .then(|| format!("\u{1b}[{n}@")),
            Capability::DeleteChars(n) => caps
                .contains(TerminalCapabilities::INSERT_DELETE_CHARS)
                .then(|| format!("\u{1b}[{n}P")),
            Capability::Bell => Some("\u{7}".to_string()),
            Capability::Flash => caps
                .contains(TerminalCapabilities::FLASH_SCREEN)
                .then(|| "\u{1b}[?5h\u{1b}[?5l".to_string()),
        }
    }

    fn motion(n: u16, letter: char, parm: bool) -> String {
        if parm {
            format!("\u{1b}[{n}{letter}")
        } else {
            format!("\u{1b}[{letter}").repeat(n as usize)
        }
    }
}
