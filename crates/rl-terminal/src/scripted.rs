//! Headless console driven by a prepared script.
//!
//! Used by the integration tests (and usable by embedders that need a
//! non-tty reader). `Pause` items model a typist hesitating: a peek at a
//! pause reports `Expired`, a read skips over it. All written text,
//! control sequences included, accumulates in a transcript for assertions.

use anyhow::Result;
use std::collections::VecDeque;
use std::time::Duration;

use crate::{ConsolePort, KeyRead, TerminalCapabilities};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptItem {
    Key(char),
    /// A gap long enough for any peek timeout to expire.
    Pause,
    Resize(u16, u16),
    Eof,
}

#[derive(Debug)]
pub struct ScriptedConsole {
    items: VecDeque<ScriptItem>,
    transcript: String,
    cols: u16,
    rows: u16,
    caps: TerminalCapabilities,
    raw_depth: u32,
}

impl ScriptedConsole {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            items: VecDeque::new(),
            transcript: String::new(),
            cols,
            rows,
            caps: TerminalCapabilities::ansi(),
            raw_depth: 0,
        }
    }

    pub fn with_capabilities(mut self, caps: TerminalCapabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Queue every code point of `text` as a key press.
    pub fn feed(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            self.items.push_back(ScriptItem::Key(ch));
        }
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        self.items.push_back(ScriptItem::Pause);
        self
    }

    pub fn resize(&mut self, cols: u16, rows: u16) -> &mut Self {
        self.items.push_back(ScriptItem::Resize(cols, rows));
        self
    }

    pub fn eof(&mut self) -> &mut Self {
        self.items.push_back(ScriptItem::Eof);
        self
    }

    /// Everything written so far, control sequences included.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Whether raw mode was entered and left symmetrically.
    pub fn raw_mode_balanced(&self) -> bool {
        self.raw_depth == 0
    }
}

impl ConsolePort for ScriptedConsole {
    fn enter_raw(&mut self) -> Result<()> {
        self.raw_depth += 1;
        Ok(())
    }

    fn leave_raw(&mut self) -> Result<()> {
        self.raw_depth = self.raw_depth.saturating_sub(1);
        Ok(())
    }

    fn size(&mut self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn read_key(&mut self, _timeout: Option<Duration>) -> Result<KeyRead> {
        loop {
            match self.items.pop_front() {
                Some(ScriptItem::Key(ch)) => return Ok(KeyRead::Char(ch)),
                // The pause has elapsed by the time a blocking read returns.
                Some(ScriptItem::Pause) => continue,
                Some(ScriptItem::Resize(c, r)) => {
                    self.cols = c;
                    self.rows = r;
                    return Ok(KeyRead::Resize(c, r));
                }
                Some(ScriptItem::Eof) | None => return Ok(KeyRead::Eof),
            }
        }
    }

    fn peek_key(&mut self, _timeout: Duration) -> Result<KeyRead> {
        match self.items.front() {
            Some(ScriptItem::Key(ch)) => Ok(KeyRead::Char(*ch)),
            Some(ScriptItem::Pause) => Ok(KeyRead::Expired),
            Some(ScriptItem::Resize(c, r)) => Ok(KeyRead::Resize(*c, *r)),
            Some(ScriptItem::Eof) => Ok(KeyRead::Eof),
            None => Ok(KeyRead::Expired),
        }
    }

    fn write_text(&mut self, s: &str) -> Result<()> {
        self.transcript.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn capabilities(&self) -> TerminalCapabilities {
        self.caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;

    #[test]
    fn feeds_chars_in_order() {
        let mut c = ScriptedConsole::new(40, 24);
        c.feed("ab").eof();
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Char('a'));
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Char('b'));
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Eof);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut c = ScriptedConsole::new(40, 24);
        c.feed("x");
        assert_eq!(c.peek_key(Duration::from_millis(1)).unwrap(), KeyRead::Char('x'));
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Char('x'));
    }

    #[test]
    fn pause_expires_peek_but_not_read() {
        let mut c = ScriptedConsole::new(40, 24);
        c.feed("\u{1b}").pause().feed("j");
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Char('\u{1b}'));
        assert_eq!(c.peek_key(Duration::from_millis(1)).unwrap(), KeyRead::Expired);
        assert_eq!(c.read_key(None).unwrap(), KeyRead::Char('j'));
    }

    #[test]
    fn capability_writes_are_captured() {
        let mut c = ScriptedConsole::new(40, 24);
        assert!(c.put(Capability::CursorLeft(2)).unwrap());
        assert_eq!(c.transcript(), "\u{1b}[2D");
    }

    #[test]
    fn raw_guard_restores_on_drop() {
        let mut c = ScriptedConsole::new(40, 24);
        {
            let _guard = crate::RawGuard::enter(&mut c).unwrap();
        }
        assert!(c.raw_mode_balanced());
    }
}
