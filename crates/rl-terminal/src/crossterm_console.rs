//! Crossterm-backed console.
//!
//! Crossterm hands us structured key events; the maps bind byte sequences.
//! The bridge re-encodes events into the conventional xterm sequences
//! (arrows as CSI, ALT as an ESC prefix, CTRL folded into the C0 range) and
//! queues them as individual code points. In raw mode CTRL-C therefore
//! arrives as 0x03 and resizes arrive as `KeyRead::Resize`, which is how the
//! dispatch loop observes what cooked mode would deliver as signals.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

use crate::{ConsolePort, KeyRead, READ_QUANTUM, TerminalCapabilities};

pub struct CrosstermConsole {
    out: io::Stdout,
    pending: VecDeque<KeyRead>,
    caps: TerminalCapabilities,
    raw: bool,
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            pending: VecDeque::new(),
            caps: TerminalCapabilities::ansi(),
            raw: false,
        }
    }

    pub fn with_capabilities(mut self, caps: TerminalCapabilities) -> Self {
        self.caps = caps;
        self
    }

    fn push_char(&mut self, ch: char) {
        self.pending.push_back(KeyRead::Char(ch));
    }

    fn push_seq(&mut self, seq: &str) {
        for ch in seq.chars() {
            self.push_char(ch);
        }
    }

    /// Fold a CTRL-modified character into the C0 range.
    fn control_fold(ch: char) -> Option<char> {
        let folded = match ch {
            'a'..='z' => (ch as u8 - b'a' + 1) as char,
            'A'..='Z' => (ch as u8 - b'A' + 1) as char,
            '@' | ' ' => '\u{0}',
            '[' => '\u{1b}',
            '\\' => '\u{1c}',
            ']' => '\u{1d}',
            '^' => '\u{1e}',
            '_' => '\u{1f}',
            '?' => '\u{7f}',
            _ => return None,
        };
        Some(folded)
    }

    fn enqueue_key(&mut self, key: KeyEvent) {
        if matches!(key.kind, KeyEventKind::Release) {
            return;
        }
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        if alt {
            self.push_char('\u{1b}');
        }
        match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if let Some(folded) = Self::control_fold(c) {
                        self.push_char(folded);
                    }
                } else {
                    self.push_char(c);
                }
            }
            KeyCode::Enter => self.push_char('\r'),
            KeyCode::Tab => self.push_char('\t'),
            KeyCode::BackTab => self.push_seq("\u{1b}[Z"),
            KeyCode::Backspace => self.push_char('\u{7f}'),
            KeyCode::Esc => self.push_char('\u{1b}'),
            KeyCode::Up => self.push_seq("\u{1b}[A"),
            KeyCode::Down => self.push_seq("\u{1b}[B"),
            KeyCode::Right => self.push_seq("\u{1b}[C"),
            KeyCode::Left => self.push_seq("\u{1b}[D"),
            KeyCode::Home => self.push_seq("\u{1b}[H"),
            KeyCode::End => self.push_seq("\u{1b}[F"),
            KeyCode::Delete => self.push_seq("\u{1b}[3~"),
            KeyCode::Insert => self.push_seq("\u{1b}[2~"),
            other => {
                trace!(target: "terminal", code = ?other, "key_ignored");
                // Remove a dangling ALT prefix for keys we drop.
                if alt {
                    self.pending.pop_back();
                }
            }
        }
    }

    fn enqueue_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => self.enqueue_key(key),
            Event::Resize(cols, rows) => self.pending.push_back(KeyRead::Resize(cols, rows)),
            // Focus and mouse traffic is irrelevant to a line reader.
            _ => {}
        }
    }

    /// Pull events until something is queued or the timeout elapses.
    /// Returns false on timeout.
    fn fill_pending(&mut self, timeout: Option<Duration>) -> Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        let mut remaining = timeout;
        loop {
            let slice = match remaining {
                Some(t) => t.min(READ_QUANTUM),
                None => READ_QUANTUM,
            };
            match event::poll(slice) {
                Ok(true) => {
                    let ev = event::read()?;
                    self.enqueue_event(ev);
                    if !self.pending.is_empty() {
                        return Ok(true);
                    }
                }
                Ok(false) => {
                    if let Some(t) = remaining {
                        let left = t.saturating_sub(slice);
                        if left.is_zero() {
                            return Ok(false);
                        }
                        remaining = Some(left);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.pending.push_back(KeyRead::Eof);
                    return Ok(true);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl ConsolePort for CrosstermConsole {
    fn enter_raw(&mut self) -> Result<()> {
        if !self.raw {
            enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn leave_raw(&mut self) -> Result<()> {
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }

    fn size(&mut self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((80, 24))
    }

    fn read_key(&mut self, timeout: Option<Duration>) -> Result<KeyRead> {
        if !self.fill_pending(timeout)? {
            return Ok(KeyRead::Expired);
        }
        Ok(self.pending.pop_front().unwrap_or(KeyRead::Eof))
    }

    fn peek_key(&mut self, timeout: Duration) -> Result<KeyRead> {
        if !self.fill_pending(Some(timeout))? {
            return Ok(KeyRead::Expired);
        }
        Ok(self.pending.front().copied().unwrap_or(KeyRead::Eof))
    }

    fn write_text(&mut self, s: &str) -> Result<()> {
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn capabilities(&self) -> TerminalCapabilities {
        self.caps
    }
}

impl Drop for CrosstermConsole {
    fn drop(&mut self) {
        let _ = self.leave_raw();
    }
}
