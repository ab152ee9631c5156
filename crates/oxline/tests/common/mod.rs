//! Shared harness: an editor wired to a scripted console whose transcript
//! stays inspectable after the read returns.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use oxline::Editor;
use rl_terminal::{Capability, ConsolePort, KeyRead, ScriptedConsole, TerminalCapabilities};

/// Delegating wrapper so a test can keep a handle on the console the editor
/// owns.
#[derive(Clone)]
pub struct SharedConsole(pub Arc<Mutex<ScriptedConsole>>);

impl SharedConsole {
    pub fn transcript(&self) -> String {
        self.0.lock().unwrap().transcript().to_string()
    }
}

impl ConsolePort for SharedConsole {
    fn enter_raw(&mut self) -> Result<()> {
        self.0.lock().unwrap().enter_raw()
    }
    fn leave_raw(&mut self) -> Result<()> {
        self.0.lock().unwrap().leave_raw()
    }
    fn size(&mut self) -> (u16, u16) {
        self.0.lock().unwrap().size()
    }
    fn read_key(&mut self, timeout: Option<Duration>) -> Result<KeyRead> {
        self.0.lock().unwrap().read_key(timeout)
    }
    fn peek_key(&mut self, timeout: Duration) -> Result<KeyRead> {
        self.0.lock().unwrap().peek_key(timeout)
    }
    fn write_text(&mut self, s: &str) -> Result<()> {
        self.0.lock().unwrap().write_text(s)
    }
    fn flush(&mut self) -> Result<()> {
        self.0.lock().unwrap().flush()
    }
    fn capabilities(&self) -> TerminalCapabilities {
        self.0.lock().unwrap().capabilities()
    }
    fn put(&mut self, cap: Capability) -> Result<bool> {
        self.0.lock().unwrap().put(cap)
    }
}

/// A 40-column editor over a scripted console, VT100-like capabilities.
pub fn editor_with_script(script: impl FnOnce(&mut ScriptedConsole)) -> (Editor, SharedConsole) {
    let mut console = ScriptedConsole::new(40, 24);
    script(&mut console);
    let shared = SharedConsole(Arc::new(Mutex::new(console)));
    let editor = Editor::new(Box::new(shared.clone()));
    (editor, shared)
}

/// Console whose writes start failing as soon as the written text contains
/// `fail_on`. Reads and raw-mode tracking still delegate to the scripted
/// console, so a test can break terminal output at a chosen point and then
/// check that raw mode was still restored.
pub struct FailingConsole {
    console: SharedConsole,
    fail_on: &'static str,
}

impl ConsolePort for FailingConsole {
    fn enter_raw(&mut self) -> Result<()> {
        self.console.enter_raw()
    }
    fn leave_raw(&mut self) -> Result<()> {
        self.console.leave_raw()
    }
    fn size(&mut self) -> (u16, u16) {
        self.console.size()
    }
    fn read_key(&mut self, timeout: Option<Duration>) -> Result<KeyRead> {
        self.console.read_key(timeout)
    }
    fn peek_key(&mut self, timeout: Duration) -> Result<KeyRead> {
        self.console.peek_key(timeout)
    }
    fn write_text(&mut self, s: &str) -> Result<()> {
        if s.contains(self.fail_on) {
            anyhow::bail!("injected write failure on {:?}", self.fail_on);
        }
        self.console.write_text(s)
    }
    fn flush(&mut self) -> Result<()> {
        self.console.flush()
    }
    fn capabilities(&self) -> TerminalCapabilities {
        self.console.capabilities()
    }
}

/// Editor over a `FailingConsole`; the returned handle inspects the inner
/// scripted console (transcript, raw-mode balance).
pub fn failing_editor(
    script: impl FnOnce(&mut ScriptedConsole),
    fail_on: &'static str,
) -> (Editor, SharedConsole) {
    let mut console = ScriptedConsole::new(40, 24);
    script(&mut console);
    let shared = SharedConsole(Arc::new(Mutex::new(console)));
    let failing = FailingConsole {
        console: shared.clone(),
        fail_on,
    };
    let editor = Editor::new(Box::new(failing));
    (editor, shared)
}

pub const ESC: char = '\u{1b}';
pub const CTRL_C: char = '\u{3}';
pub const CTRL_D: char = '\u{4}';
pub const CTRL_R: char = '\u{12}';
pub const CTRL_T: char = '\u{14}';
pub const CTRL_U: char = '\u{15}';
pub const CTRL_V: char = '\u{16}';
pub const CTRL_W: char = '\u{17}';
pub const CTRL_Y: char = '\u{19}';
pub const DEL: char = '\u{7f}';
pub const BELL: char = '\u{7}';
