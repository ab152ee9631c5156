//! The editor facade: owns the terminal port, the stores, the key maps and
//! the per-read session, and runs the outer `read_line` loop.
//!
//! Loop shape per iteration: decode one binding (macros replay through the
//! push-back stack), refresh the size snapshot, hand the operation to the
//! isearch sub-machine or the normal dispatcher, then reconcile the screen.
//! `Done` / `Eof` / `Interrupt` break out; cleanup (cursor to the end of the
//! content, newline, history cursor to the end, raw mode restored) runs on
//! every exit path.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use rl_config::{BellStyle, Variables};
use rl_events::Operation;
use rl_keymap::{Binding, KeyMap, maps};
use rl_render::Redisplay;
use rl_state::{History, KillRing};
use rl_terminal::{Capability, ConsolePort, KeyRead};
use rl_text::EditBuffer;

use crate::dispatch::{self, DispatchState, Mode, Session};
use crate::decode::Decoded;
use crate::{Clipboard, Completer, Highlighter, ReadError, Widget};

pub(crate) enum Outcome {
    Line(String),
    Eof,
    Interrupted(String),
}

/// Scopes raw mode over one read. The editor needs the port throughout the
/// session, so this guards the whole `Editor` rather than borrowing the port
/// the way `rl_terminal::RawGuard` does for direct port users; the effect is
/// the same: `leave_raw` runs on drop, unwinds included.
struct RawScope<'a> {
    ed: &'a mut Editor,
}

impl<'a> RawScope<'a> {
    fn enter(ed: &'a mut Editor) -> Result<Self> {
        ed.port.enter_raw()?;
        Ok(Self { ed })
    }
}

impl Drop for RawScope<'_> {
    fn drop(&mut self) {
        let _ = self.ed.port.leave_raw();
    }
}

pub struct Editor {
    pub(crate) port: Box<dyn ConsolePort>,
    pub(crate) vars: Variables,
    config_path: Option<PathBuf>,

    pub(crate) history: History,
    pub(crate) kill_ring: KillRing,
    pub(crate) keymaps: HashMap<String, KeyMap<Widget>>,
    pub(crate) keymap_name: String,

    pub(crate) completers: Vec<Box<dyn Completer>>,
    pub(crate) highlighter: Option<Highlighter>,
    pub(crate) clipboard: Option<Box<dyn Clipboard>>,

    pub(crate) redisplay: Redisplay,
    pub(crate) cols: u16,
    pub(crate) rows: u16,

    // Per-read session state.
    pub(crate) buf: EditBuffer,
    pub(crate) prompt: String,
    pub(crate) mask: Option<char>,
    pub(crate) post: Vec<String>,
    pub(crate) st: DispatchState,
    pub(crate) session: Session,
}

impl Editor {
    pub fn new(port: Box<dyn ConsolePort>) -> Self {
        let mut keymaps = HashMap::new();
        keymaps.insert("emacs".to_string(), maps::emacs());
        keymaps.insert("vi-insert".to_string(), maps::vi_insert());
        keymaps.insert("vi-move".to_string(), maps::vi_move());
        let mut ed = Self {
            port,
            vars: Variables::default(),
            config_path: None,
            history: History::default(),
            kill_ring: KillRing::default(),
            keymaps,
            keymap_name: "emacs".to_string(),
            completers: Vec::new(),
            highlighter: None,
            clipboard: None,
            redisplay: Redisplay::new(),
            cols: 80,
            rows: 24,
            buf: EditBuffer::new(),
            prompt: String::new(),
            mask: None,
            post: Vec::new(),
            st: DispatchState::default(),
            session: Session::default(),
        };
        ed.apply_tty_special_chars();
        ed
    }

    /// Load variables from `path` now and on `re-read-init-file`.
    pub fn with_config(mut self, path: PathBuf) -> Self {
        self.vars = rl_config::load_from(Some(path.clone()));
        self.config_path = Some(path);
        self.apply_tty_special_chars();
        self
    }

    // ------------------------------------------------------------------
    // Caller-facing accessors
    // ------------------------------------------------------------------

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.vars
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn set_history(&mut self, history: History) -> History {
        std::mem::replace(&mut self.history, history)
    }

    pub fn set_kill_ring(&mut self, ring: KillRing) -> KillRing {
        std::mem::replace(&mut self.kill_ring, ring)
    }

    pub fn highlighter(&self) -> Option<&Highlighter> {
        self.highlighter.as_ref()
    }

    pub fn set_highlighter(&mut self, h: Option<Highlighter>) {
        self.highlighter = h;
    }

    pub fn add_completer(&mut self, c: Box<dyn Completer>) {
        self.completers.push(c);
    }

    pub fn clear_completers(&mut self) {
        self.completers.clear();
    }

    pub fn set_clipboard(&mut self, c: Option<Box<dyn Clipboard>>) {
        self.clipboard = c;
    }

    /// Name of the active key map: `emacs`, `vi-insert` or `vi-move`.
    pub fn keymap_name(&self) -> &str {
        &self.keymap_name
    }

    pub fn set_keymap(&mut self, name: &str) -> bool {
        if self.keymaps.contains_key(name) {
            self.keymap_name = name.to_string();
            true
        } else {
            false
        }
    }

    /// Bind a single code point in the active map to a user widget.
    pub fn bind_widget(&mut self, ch: char, widget: Widget) {
        if let Some(map) = self.keymaps.get_mut(&self.keymap_name) {
            map.bind(&ch.to_string(), Binding::Widget(widget));
        }
    }

    /// Bind a key sequence in the active map to an operation.
    pub fn bind_operation(&mut self, seq: &str, op: Operation) {
        if let Some(map) = self.keymaps.get_mut(&self.keymap_name) {
            map.bind(seq, Binding::Op(op));
        }
    }

    // Surface for user widgets: the current line and cursor, and insertion
    // through the same path typed text takes (overtype applies).

    pub fn line(&self) -> String {
        self.buf.to_line()
    }

    pub fn cursor(&self) -> usize {
        self.buf.cursor()
    }

    pub fn insert_text(&mut self, s: &str) {
        self.buf.insert(s);
    }

    /// Force the next redisplay to repaint from scratch.
    pub fn redraw_line(&mut self) {
        self.redisplay.invalidate();
    }

    // ------------------------------------------------------------------
    // read_line entry points
    // ------------------------------------------------------------------

    pub fn read_line(&mut self) -> Result<String, ReadError> {
        self.read_line_with("", None, "")
    }

    pub fn read_line_prompt(&mut self, prompt: &str) -> Result<String, ReadError> {
        self.read_line_with(prompt, None, "")
    }

    pub fn read_line_masked(&mut self, prompt: &str, mask: Option<char>) -> Result<String, ReadError> {
        self.read_line_with(prompt, mask, "")
    }

    pub fn read_line_with(
        &mut self,
        prompt: &str,
        mask: Option<char>,
        initial: &str,
    ) -> Result<String, ReadError> {
        self.prompt = prompt.to_string();
        self.mask = mask;
        self.buf = EditBuffer::from_str(initial);
        self.buf.set_cursor(0);
        self.post.clear();
        self.st = DispatchState::default();
        self.session = Session::default();
        if self.keymap_name == "vi-move" {
            // A vi session always starts a fresh line inserting.
            self.keymap_name = "vi-insert".to_string();
        }

        // Raw mode is scoped by a drop guard, so restoration runs on every
        // exit: normal return, any I/O error below, or an unwind.
        let mut scope = RawScope::enter(self).map_err(ReadError::Terminal)?;
        let outcome = scope.ed.edit_loop();
        let cleanup = scope.ed.cleanup();
        drop(scope);
        let outcome = outcome.map_err(ReadError::Terminal)?;
        cleanup.map_err(ReadError::Terminal)?;
        match outcome {
            Outcome::Line(s) => Ok(s),
            Outcome::Eof => Err(ReadError::Eof),
            Outcome::Interrupted(s) => Err(ReadError::Interrupted(s)),
        }
    }

    // ------------------------------------------------------------------
    // The outer loop
    // ------------------------------------------------------------------

    fn edit_loop(&mut self) -> Result<Outcome> {
        self.refresh_size();
        self.redisplay.invalidate();
        self.redisplay_now()?;
        self.port.flush()?;

        loop {
            let Some(decoded) = self.read_binding()? else {
                // Stream closed mid-decode.
                return Ok(Outcome::Eof);
            };
            self.refresh_size();
            match decoded {
                Decoded::Macro(text) => {
                    for ch in text.chars().rev() {
                        self.st.push_back.push(ch);
                    }
                }
                Decoded::Widget(w, _seq) => {
                    let ok = w.as_ref()(self)?;
                    if !ok {
                        self.beep()?;
                    }
                }
                Decoded::Op(op, seq) => {
                    if matches!(self.st.mode, Mode::Search | Mode::ForwardSearch) {
                        dispatch::isearch_step(self, op, &seq)?;
                    } else {
                        dispatch::normal_dispatch(self, op, &seq)?;
                    }
                }
            }

            match self.st.mode {
                Mode::Done => return self.finish(),
                Mode::Eof => return Ok(Outcome::Eof),
                Mode::Interrupt => return Ok(Outcome::Interrupted(self.buf.to_line())),
                _ => {}
            }
            self.redisplay_now()?;
            self.port.flush()?;
        }
    }

    /// Accept path: event expansion, echo of a changed line, history add.
    fn finish(&mut self) -> Result<Outcome> {
        self.post.clear();
        let mut line = self.buf.to_line();
        if !self.vars.disable_event_expansion {
            match rl_expand::expand(&line, &self.history) {
                Ok(exp) => {
                    if exp.changed {
                        // Show what will actually run.
                        self.buf.replace_with(&exp.text);
                        self.redisplay_now()?;
                    }
                    line = exp.text;
                }
                Err(e) => {
                    debug!(target: "dispatch", error = %e, "event_expansion_failed");
                    self.beep()?;
                    self.buf.clear();
                    return Ok(Outcome::Line(String::new()));
                }
            }
        }
        if !self.vars.disable_history && !line.is_empty() {
            self.history.add(&line);
        }
        Ok(Outcome::Line(line))
    }

    /// Runs on every exit path: park the cursor after the content, emit a
    /// newline, reset the stores' cursors. Every step runs even when an
    /// earlier one fails; the first error is reported after the rest have
    /// had their chance. Raw mode itself is not touched here — `RawScope`
    /// restores it on drop, so a failing write can never strand the
    /// terminal.
    fn cleanup(&mut self) -> Result<()> {
        let mut first_err: Option<anyhow::Error> = None;
        self.post.clear();
        let end = self.buf.len();
        let cur = self.buf.cursor();
        self.buf.set_cursor(end);
        let parked = self.redisplay_now();
        self.buf.set_cursor(cur);
        if let Err(e) = parked {
            first_err.get_or_insert(e);
        }
        if let Err(e) = self.port.write_text("\r\n") {
            first_err.get_or_insert(e);
        }
        if let Err(e) = self.port.flush() {
            first_err.get_or_insert(e);
        }
        self.redisplay.invalidate();
        self.history.move_to_end();
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Shared services for widgets and the dispatcher
    // ------------------------------------------------------------------

    pub(crate) fn refresh_size(&mut self) {
        let (c, r) = self.port.size();
        self.cols = c;
        self.rows = r;
    }

    pub(crate) fn active_map(&self) -> &KeyMap<Widget> {
        self.keymaps
            .get(&self.keymap_name)
            .expect("active keymap always present")
    }

    /// Compose prompt + display form of the buffer + post lines and hand the
    /// result to the redisplay engine.
    pub(crate) fn redisplay_now(&mut self) -> Result<()> {
        let line = self.buf.to_line();
        let (display, cursor_disp) = match self.mask {
            Some('\0') => (String::new(), 0),
            Some(m) => (m.to_string().repeat(self.buf.len()), self.buf.cursor()),
            None => match &self.highlighter {
                Some(h) => {
                    let styled = h(&line);
                    let cursor = self.buf.cursor().min(styled.chars().count());
                    (styled, cursor)
                }
                None => (line, self.buf.cursor()),
            },
        };
        let mut text = format!("{}{}", self.prompt, display);
        for p in &self.post {
            text.push('\n');
            text.push_str(p);
        }
        let cursor_char = self.prompt.chars().count() + cursor_disp;
        self.redisplay.render(self.port.as_mut(), &text, cursor_char)
    }

    /// Ring or flash per `bell-style`.
    pub(crate) fn beep(&mut self) -> Result<()> {
        let style = self.vars.bell_style;
        let audible = |p: &mut dyn ConsolePort| p.put(Capability::Bell).map(|_| ());
        match style {
            BellStyle::None | BellStyle::Off => return Ok(()),
            BellStyle::Audible => audible(self.port.as_mut())?,
            BellStyle::Visible => {
                if !self.port.put(Capability::Flash)? {
                    audible(self.port.as_mut())?;
                }
            }
            BellStyle::On => {
                if self.vars.prefer_visible_bell {
                    if !self.port.put(Capability::Flash)? {
                        audible(self.port.as_mut())?;
                    }
                } else {
                    audible(self.port.as_mut())?;
                }
            }
        }
        self.port.flush()?;
        Ok(())
    }

    /// Blocking read of the next code point, handling resizes in place.
    /// `None` means EOF.
    pub(crate) fn read_raw_char(&mut self) -> Result<Option<char>> {
        if let Some(ch) = self.st.push_back.pop() {
            return Ok(Some(ch));
        }
        loop {
            match self.port.read_key(None)? {
                KeyRead::Char(ch) => {
                    if self.st.recording {
                        self.st.current_macro.push(ch);
                    }
                    return Ok(Some(ch));
                }
                KeyRead::Eof => return Ok(None),
                KeyRead::Expired => continue,
                KeyRead::Resize(c, r) => self.handle_resize(c, r)?,
            }
        }
    }

    pub(crate) fn handle_resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.cols = cols;
        self.rows = rows;
        self.redisplay.invalidate();
        self.port.put(Capability::CarriageReturn)?;
        self.port.put(Capability::ClearToEol)?;
        self.redisplay_now()?;
        self.port.flush()?;
        Ok(())
    }

    /// Reload variables from the configured path (`re-read-init-file`).
    pub(crate) fn reload_variables(&mut self) {
        self.vars = rl_config::load_from(self.config_path.clone());
        self.apply_tty_special_chars();
    }

    /// Honor the tty's VERASE / VWERASE / VKILL / VLNEXT control characters
    /// in the emacs and vi-insert maps when `bind-tty-special-chars` is on.
    fn apply_tty_special_chars(&mut self) {
        if !self.vars.bind_tty_special_chars {
            return;
        }
        let sc = self.port.special_chars();
        let rebinds = [
            ('\u{7f}', sc.erase, Operation::BackwardDeleteChar),
            ('\u{17}', sc.werase, Operation::UnixWordRubout),
            ('\u{15}', sc.kill, Operation::UnixLineDiscard),
            ('\u{16}', sc.lnext, Operation::QuotedInsert),
        ];
        for name in ["emacs", "vi-insert"] {
            let map = self.keymaps.get_mut(name).expect("shipped keymap");
            for (default_ch, tty_ch, op) in rebinds {
                if tty_ch != default_ch {
                    map.bind(&default_ch.to_string(), Binding::Op(Operation::SelfInsert));
                    map.bind(&tty_ch.to_string(), Binding::Op(op));
                }
            }
        }
    }
}
