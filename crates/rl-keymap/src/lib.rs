//! Key sequence to binding resolution.
//!
//! A `KeyMap` is a tree keyed by single code points. Node values are
//! `Binding`s: an operation tag, a macro string, a user widget, or a nested
//! sub-map. Resolution is greedy-longest: the decoder feeds code points one
//! at a time, descends while the value is a sub-map, and walks back (pushing
//! code points back to the input) when an extension fails, preferring a
//! sub-map's `other_key` default on the way out.
//!
//! The widget payload is a type parameter so this crate stays independent of
//! the editor type it ultimately closes over.
//!
//! Edges are kept in a small vector and scanned linearly; maps are keyboard
//! sized, so locality beats hashing here.

use smallvec::SmallVec;
use tracing::trace;

pub mod maps;

pub use rl_events::Operation;

/// Value a key sequence resolves to.
#[derive(Debug, Clone)]
pub enum Binding<W> {
    /// A tag dispatched through the widget table.
    Op(Operation),
    /// Replay these characters as if typed.
    Macro(String),
    /// A caller-supplied widget.
    Widget(W),
    /// Nested map: the sequence so far is a strict prefix.
    Map(Box<KeyMap<W>>),
}

impl<W> Binding<W> {
    pub fn is_map(&self) -> bool {
        matches!(self, Binding::Map(_))
    }
}

#[derive(Debug, Clone)]
pub struct KeyMap<W> {
    name: String,
    edges: SmallVec<[(char, Binding<W>); 4]>,
    other_key: Option<Box<Binding<W>>>,
}

impl<W> Default for KeyMap<W> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<W> KeyMap<W> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edges: SmallVec::new(),
            other_key: None,
        }
    }

    /// Map name (`emacs`, `vi-insert`, `vi-move`); empty on sub-maps.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default binding used when no edge matches the next code point.
    pub fn other_key(&self) -> Option<&Binding<W>> {
        self.other_key.as_deref()
    }

    pub fn set_other_key(&mut self, binding: Binding<W>) {
        self.other_key = Some(Box::new(binding));
    }

    /// Bind `seq` to `binding`, creating sub-maps along the way. Binding a
    /// longer sequence over a concrete shorter one replaces it with a
    /// sub-map; binding a shorter sequence over an existing sub-map replaces
    /// the whole subtree.
    pub fn bind(&mut self, seq: &str, binding: Binding<W>) {
        let chars: Vec<char> = seq.chars().collect();
        assert!(!chars.is_empty(), "empty key sequence");
        self.bind_chars(&chars, binding);
    }

    fn bind_chars(&mut self, seq: &[char], binding: Binding<W>) {
        let ch = seq[0];
        if seq.len() == 1 {
            self.set_edge(ch, binding);
            return;
        }
        // Descend, converting any concrete node into a sub-map.
        let needs_map = !matches!(self.edge(ch), Some(Binding::Map(_)));
        if needs_map {
            self.set_edge(ch, Binding::Map(Box::new(KeyMap::new(""))));
        }
        match self.edge_mut(ch) {
            Some(Binding::Map(sub)) => sub.bind_chars(&seq[1..], binding),
            _ => unreachable!("sub-map was just installed"),
        }
    }

    fn set_edge(&mut self, ch: char, binding: Binding<W>) {
        if let Some(slot) = self.edges.iter_mut().find(|(c, _)| *c == ch) {
            slot.1 = binding;
        } else {
            self.edges.push((ch, binding));
        }
    }

    fn edge(&self, ch: char) -> Option<&Binding<W>> {
        self.edges.iter().find(|(c, _)| *c == ch).map(|(_, b)| b)
    }

    fn edge_mut(&mut self, ch: char) -> Option<&mut Binding<W>> {
        self.edges
            .iter_mut()
            .find(|(c, _)| *c == ch)
            .map(|(_, b)| b)
    }

    /// Single-step lookup on this node only (no `other_key` fallback).
    pub fn get_char(&self, ch: char) -> Option<&Binding<W>> {
        self.edge(ch)
    }

    /// Mutable single-step lookup, used to adjust sub-map defaults after
    /// binding (the vi-insert ESC map installs `ViMovementMode` this way).
    pub fn get_mut_char(&mut self, ch: char) -> Option<&mut Binding<W>> {
        self.edge_mut(ch)
    }

    /// Lookup of a whole sequence; a sequence ending inside the tree returns
    /// the sub-map binding at that point.
    pub fn get(&self, seq: &str) -> Option<&Binding<W>> {
        let chars: Vec<char> = seq.chars().collect();
        self.get_slice(&chars)
    }

    pub fn get_slice(&self, seq: &[char]) -> Option<&Binding<W>> {
        let (&first, rest) = seq.split_first()?;
        let binding = self.edge(first)?;
        if rest.is_empty() {
            trace!(target: "keymap", map = %self.name, ch = %first.escape_debug(), "resolve");
            return Some(binding);
        }
        match binding {
            Binding::Map(sub) => sub.get_slice(rest),
            _ => None,
        }
    }
}
