//! Key decoding: code points in, one concrete binding out.
//!
//! Greedy-longest walk of the active key map with pushback backoff. Special
//! cases, in the order they apply to each incoming code point: macro
//! recording, quoted insert, `DoLowercaseVersion` re-resolution, the ESC
//! ambiguity peek, and kill-ring bookkeeping once a concrete binding is
//! chosen.
//!
//! A lone ESC is ambiguous: it may be a binding of its own (vi-insert) or a
//! search terminator, but it is also the prefix of every cursor-key
//! sequence. When the conditions hold and nothing is pushed back, a peek
//! bounded by `keyseq-timeout` decides: expiry resolves the ESC sub-map to
//! its `other_key` default (or its own ESC entry); a prompt next byte keeps
//! the sequence walk going.

use anyhow::Result;
use std::time::Duration;
use tracing::trace;

use rl_events::Operation;
use rl_keymap::Binding;
use rl_keymap::maps::ESC;
use rl_terminal::KeyRead;

use crate::dispatch::Mode;
use crate::{Editor, Widget};

/// A fully decoded binding plus the sequence text that produced it.
pub(crate) enum Decoded {
    Op(Operation, String),
    Macro(String),
    Widget(Widget, String),
}

/// Lookup outcome with everything the decoder needs cloned out, so no map
/// borrow outlives the step.
enum Found {
    None,
    Prefix {
        other: Option<Binding<Widget>>,
        esc_entry: Option<Binding<Widget>>,
    },
    Bound(Binding<Widget>),
}

impl Editor {
    fn look(&self, seq: &[char]) -> Found {
        match self.active_map().get_slice(seq) {
            None => Found::None,
            Some(Binding::Map(sub)) => Found::Prefix {
                other: sub.other_key().cloned(),
                esc_entry: sub.get_char(ESC).cloned(),
            },
            Some(b) => Found::Bound(b.clone()),
        }
    }

    fn finalize(&mut self, binding: Binding<Widget>, seq: String) -> Decoded {
        // Kill-ring bookkeeping: any concrete binding that is not a yank
        // invalidates yank-pop, any that is not a kill stops coalescing.
        let (is_kill, is_yank) = match &binding {
            Binding::Op(op) => (op.is_kill(), op.is_yank()),
            _ => (false, false),
        };
        if !is_yank {
            self.kill_ring.reset_last_yank();
        }
        if !is_kill {
            self.kill_ring.reset_last_kill();
        }
        trace!(target: "dispatch", seq = %seq.escape_debug(), "binding");
        match binding {
            Binding::Op(op) => Decoded::Op(op, seq),
            Binding::Macro(m) => Decoded::Macro(m),
            Binding::Widget(w) => Decoded::Widget(w, seq),
            Binding::Map(_) => unreachable!("sub-maps never finalize"),
        }
    }

    /// Decode the next binding. `None` means the input stream closed.
    pub(crate) fn read_binding(&mut self) -> Result<Option<Decoded>> {
        let mut op_buffer: Vec<char> = Vec::new();
        loop {
            let Some(ch) = self.next_code_point()? else {
                return Ok(None);
            };
            op_buffer.push(ch);

            if self.st.quoted_insert {
                self.st.quoted_insert = false;
                let seq: String = op_buffer.iter().collect();
                return Ok(Some(self.finalize(Binding::Op(Operation::SelfInsert), seq)));
            }

            let mut found = self.look(&op_buffer);

            // Uppercase meta keys fold to their lowercase binding.
            if let Found::Bound(Binding::Op(Operation::DoLowercaseVersion)) = found {
                let last = op_buffer.last_mut().expect("non-empty sequence");
                *last = last.to_ascii_lowercase();
                found = self.look(&op_buffer);
            }

            // ESC ambiguity peek.
            if op_buffer.len() == 1
                && op_buffer[0] == ESC
                && self.st.push_back.is_empty()
                && matches!(found, Found::Prefix { .. })
                && self.esc_peek_applies()
            {
                let timeout = Duration::from_millis(self.vars.keyseq_timeout);
                if matches!(self.port.peek_key(timeout)?, KeyRead::Expired)
                    && let Found::Prefix { other, esc_entry } = &found
                    && let Some(fallback) = other.clone().or_else(|| esc_entry.clone())
                {
                    return Ok(Some(self.finalize(fallback, ESC.to_string())));
                }
            }

            match found {
                Found::Prefix { .. } => continue,
                Found::Bound(binding) => {
                    let seq: String = op_buffer.iter().collect();
                    return Ok(Some(self.finalize(binding, seq)));
                }
                Found::None => {
                    // Backoff: strip code points from the tail, pushing them
                    // back, until a prefix with a default (or a concrete
                    // binding) is exposed.
                    while let Some(last) = op_buffer.pop() {
                        self.st.push_back.push(last);
                        if op_buffer.is_empty() {
                            break;
                        }
                        match self.look(&op_buffer) {
                            Found::Bound(binding) => {
                                let seq: String = op_buffer.iter().collect();
                                return Ok(Some(self.finalize(binding, seq)));
                            }
                            Found::Prefix { other: Some(b), .. } => {
                                let seq: String = op_buffer.iter().collect();
                                return Ok(Some(self.finalize(b, seq)));
                            }
                            _ => {}
                        }
                    }
                    // Nothing matched: consume one code point through the
                    // root default, or beep it away.
                    let ch = self.st.push_back.pop().expect("just pushed");
                    match self.active_map().other_key().cloned() {
                        Some(b) => return Ok(Some(self.finalize(b, ch.to_string()))),
                        None => {
                            self.beep()?;
                            // Restart the walk on the remaining input.
                            continue;
                        }
                    }
                }
            }
        }
    }

    fn esc_peek_applies(&self) -> bool {
        if self.keymap_name == "vi-insert" {
            return true;
        }
        matches!(self.st.mode, Mode::Search | Mode::ForwardSearch)
            && self.vars.is_search_terminator(ESC)
    }

    /// Next code point: the push-back stack first, then a blocking read.
    /// Freshly read code points (only) feed an in-progress macro recording;
    /// replayed ones were recorded when first typed.
    fn next_code_point(&mut self) -> Result<Option<char>> {
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
}
