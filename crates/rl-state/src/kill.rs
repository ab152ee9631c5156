//! Bounded ring of killed text with yank / yank-pop rotation.
//!
//! Consecutive kills coalesce: a forward kill appends to the active slot, a
//! backward kill prepends, so killing word-by-word across a line builds one
//! contiguous slot. The dispatcher is responsible for calling
//! `reset_last_kill` / `reset_last_yank` whenever an unrelated operation
//! intervenes; the ring itself never sees key traffic.

use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 60;

#[derive(Debug, Clone)]
pub struct KillRing {
    slots: Vec<String>,
    head: usize,
    yank_slot: usize,
    capacity: usize,
    last_kill: bool,
    last_yank: bool,
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl KillRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            head: 0,
            yank_slot: 0,
            capacity: capacity.max(1),
            last_kill: false,
            last_yank: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Record a forward kill. Coalesces by appending when the previous
    /// operation was also a kill.
    pub fn add(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.last_kill && !self.slots.is_empty() {
            self.slots[self.head].push_str(text);
        } else {
            self.push_slot(text.to_string());
        }
        self.last_kill = true;
        trace!(target: "killring", slot = self.head, len = self.slots[self.head].len(), "kill_forward");
    }

    /// Record a backward kill. Coalesces by prepending.
    pub fn add_backwards(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.last_kill && !self.slots.is_empty() {
            self.slots[self.head].insert_str(0, text);
        } else {
            self.push_slot(text.to_string());
        }
        self.last_kill = true;
        trace!(target: "killring", slot = self.head, len = self.slots[self.head].len(), "kill_backward");
    }

    fn push_slot(&mut self, text: String) {
        if self.slots.len() < self.capacity {
            self.slots.push(text);
            self.head = self.slots.len() - 1;
        } else {
            self.head = (self.head + 1) % self.capacity;
            self.slots[self.head] = text;
        }
    }

    /// Most recent slot; arms yank-pop.
    pub fn yank(&mut self) -> Option<&str> {
        if self.slots.is_empty() {
            return None;
        }
        self.yank_slot = self.head;
        self.last_yank = true;
        Some(&self.slots[self.yank_slot])
    }

    /// Rotate one slot backward (toward older kills, cycling). Returns `None`
    /// unless the previous operation was a yank or yank-pop.
    pub fn yank_pop(&mut self) -> Option<&str> {
        if !self.last_yank || self.slots.is_empty() {
            return None;
        }
        self.yank_slot = if self.yank_slot == 0 {
            self.slots.len() - 1
        } else {
            self.yank_slot - 1
        };
        Some(&self.slots[self.yank_slot])
    }

    pub fn reset_last_kill(&mut self) {
        self.last_kill = false;
    }

    pub fn reset_last_yank(&mut self) {
        self.last_yank = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_forward_kills_append() {
        let mut r = KillRing::default();
        r.add("one ");
        r.add("two");
        assert_eq!(r.yank(), Some("one two"));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn consecutive_backward_kills_prepend() {
        let mut r = KillRing::default();
        r.add_backwards("two");
        r.add_backwards("one ");
        assert_eq!(r.yank(), Some("one two"));
    }

    #[test]
    fn interleaved_reset_starts_new_slot() {
        let mut r = KillRing::default();
        r.add("x");
        r.reset_last_kill();
        r.add("y");
        assert_eq!(r.len(), 2);
        assert_eq!(r.yank(), Some("y"));
    }

    #[test]
    fn yank_pop_requires_prior_yank() {
        let mut r = KillRing::default();
        r.add("x");
        assert_eq!(r.yank_pop(), None);
        assert_eq!(r.yank(), Some("x"));
        r.reset_last_yank();
        assert_eq!(r.yank_pop(), None);
    }

    #[test]
    fn yank_pop_cycles_backward_through_slots() {
        let mut r = KillRing::default();
        for s in ["a", "b", "c"] {
            r.add(s);
            r.reset_last_kill();
        }
        assert_eq!(r.yank(), Some("c"));
        assert_eq!(r.yank_pop(), Some("b"));
        assert_eq!(r.yank_pop(), Some("a"));
        // Cycles back to the most recent slot.
        assert_eq!(r.yank_pop(), Some("c"));
    }

    #[test]
    fn capacity_overwrites_oldest() {
        let mut r = KillRing::new(2);
        for s in ["a", "b", "c"] {
            r.add(s);
            r.reset_last_kill();
        }
        assert_eq!(r.len(), 2);
        assert_eq!(r.yank(), Some("c"));
        assert_eq!(r.yank_pop(), Some("b"));
        assert_eq!(r.yank_pop(), Some("c"));
    }

    #[test]
    fn empty_kill_is_ignored() {
        let mut r = KillRing::default();
        r.add("");
        assert!(r.is_empty());
        assert_eq!(r.yank(), None);
    }
}
