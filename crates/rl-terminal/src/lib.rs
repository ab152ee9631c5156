//! Terminal port abstraction and crossterm implementation.
//!
//! The port delivers *code points*, not structured key events: the crossterm
//! implementation re-encodes arrows, Home/End and ALT-modified keys back into
//! the escape sequences the key maps bind, so sequence decoding stays in one
//! place (the keymap walk). All reads take explicit timeouts; a blocking read
//! polls on a quantum so window-size changes are observed promptly.
//!
//! `RawGuard` scopes raw mode: it restores the previous terminal state on
//! drop, including unwinds.

use anyhow::Result;
use std::time::Duration;

pub mod capabilities;
mod crossterm_console;
pub mod scripted;

pub use capabilities::{Capability, TerminalCapabilities};
pub use crossterm_console::CrosstermConsole;
pub use scripted::{ScriptItem, ScriptedConsole};

/// Polling quantum for blocking reads.
pub const READ_QUANTUM: Duration = Duration::from_millis(100);

/// Outcome of a timed read or peek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRead {
    /// One decoded code point.
    Char(char),
    /// Input stream closed.
    Eof,
    /// Timeout elapsed with nothing available.
    Expired,
    /// Window size changed to (cols, rows); no code point consumed.
    Resize(u16, u16),
}

/// The tty special control characters relevant to default bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialChars {
    pub erase: char,
    pub werase: char,
    pub kill: char,
    pub lnext: char,
}

impl Default for SpecialChars {
    fn default() -> Self {
        Self {
            erase: '\u{7f}',
            werase: '\u{17}',
            kill: '\u{15}',
            lnext: '\u{16}',
        }
    }
}

/// A raw-mode terminal able to deliver timed code-point reads and
/// capability-gated control sequences.
pub trait ConsolePort {
    fn enter_raw(&mut self) -> Result<()>;
    fn leave_raw(&mut self) -> Result<()>;

    /// Current size as (columns, rows).
    fn size(&mut self) -> (u16, u16);

    /// Read one code point. `None` blocks (on the polling quantum);
    /// `Some(t)` returns `Expired` after `t`.
    fn read_key(&mut self, timeout: Option<Duration>) -> Result<KeyRead>;

    /// Like `read_key` but leaves the code point queued.
    fn peek_key(&mut self, timeout: Duration) -> Result<KeyRead>;

    fn write_text(&mut self, s: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    fn capabilities(&self) -> TerminalCapabilities;

    /// Emit a control sequence if the terminal advertises it. Returns
    /// whether anything was written.
    fn put(&mut self, cap: Capability) -> Result<bool> {
        match cap.sequence(self.capabilities()) {
            Some(seq) => {
                self.write_text(&seq)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Control characters configured on the tty. The crossterm backend has
    /// no termios query, so these are the conventional defaults unless a
    /// port overrides them.
    fn special_chars(&self) -> SpecialChars {
        SpecialChars::default()
    }
}

/// RAII guard ensuring raw mode is left even if the caller early-returns or
/// panics.
pub struct RawGuard<'a> {
    port: &'a mut dyn ConsolePort,
}

impl<'a> RawGuard<'a> {
    pub fn enter(port: &'a mut dyn ConsolePort) -> Result<Self> {
        port.enter_raw()?;
        Ok(Self { port })
    }

    pub fn port(&mut self) -> &mut dyn ConsolePort {
        self.port
    }
}

impl Drop for RawGuard<'_> {
    fn drop(&mut self) {
        let _ = self.port.leave_raw();
    }
}
