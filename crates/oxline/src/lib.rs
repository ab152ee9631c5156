//! oxline: a line editor for terminal programs.
//!
//! Reads one logical line from a raw-mode terminal with emacs and vi
//! editing, history recall and incremental search, a kill ring, keyboard
//! macros, tab completion and history event expansion (`!!`, `!n`,
//! `^a^b^`, ...). The screen is reconciled incrementally after every key.
//!
//! ```no_run
//! use oxline::{CrosstermConsole, Editor};
//!
//! let mut ed = Editor::new(Box::new(CrosstermConsole::new()));
//! match ed.read_line_prompt("> ") {
//!     Ok(line) => println!("{line}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! History and the kill ring persist across calls and can be swapped by the
//! caller between reads; everything else is per-call session state.

use anyhow::Result;
use std::sync::Arc;

mod complete;
mod decode;
mod dispatch;
mod editor;
mod messages;

pub use editor::Editor;
pub use rl_config::{BellStyle, Variables};
pub use rl_events::Operation;
pub use rl_keymap::{Binding, KeyMap};
pub use rl_state::{History, KillRing};
pub use rl_terminal::{ConsolePort, CrosstermConsole, ScriptedConsole};

/// A user-supplied edit action bound to a key sequence. Returns whether the
/// action succeeded; failures beep.
pub type Widget = Arc<dyn Fn(&mut Editor) -> Result<bool>>;

/// Transforms the buffer text for display only. The result is rendered
/// verbatim, so it should be plain printable text of unchanged length.
pub type Highlighter = Box<dyn Fn(&str) -> String>;

/// Candidate source for tab completion.
pub trait Completer {
    /// Inspect `line` with the cursor at char index `cursor`, push
    /// candidates, and return the char index the candidates replace from
    /// (`None` when this completer has nothing to offer).
    fn complete(&self, line: &str, cursor: usize, candidates: &mut Vec<String>) -> Option<usize>;
}

/// Optional system clipboard access. Failures are swallowed by the paste
/// widget, which just beeps.
pub trait Clipboard {
    fn get_text(&mut self) -> Result<String>;
}

/// Failures surfaced by [`Editor::read_line`].
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// EOF on an empty line (CTRL-D) or the input stream closed.
    #[error("end of input")]
    Eof,
    /// CTRL-C; carries the buffer contents at the time of interruption.
    #[error("interrupted")]
    Interrupted(String),
    /// Terminal I/O failure.
    #[error(transparent)]
    Terminal(#[from] anyhow::Error),
}
