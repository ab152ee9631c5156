//! Per-line character diff: common prefix / suffix trisection.
//!
//! Old and new screen lines are already glyph-expanded, so a char-level walk
//! is cell-accurate as long as widths come from the same table. The result
//! decomposes both lines into `prefix + mid + suffix` where only the middle
//! differs; pure insertions and pure deletions (empty middle on one side)
//! unlock the insert-chars / delete-chars fast paths in the engine.

use rl_text::width::str_width;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trisection {
    /// Width of the unchanged head.
    pub prefix_cells: usize,
    /// Glyphs removed from the old line.
    pub old_mid: String,
    pub old_mid_cells: usize,
    /// Glyphs inserted in the new line.
    pub new_mid: String,
    pub new_mid_cells: usize,
    /// Unchanged tail, shared by both lines.
    pub suffix: String,
    pub suffix_cells: usize,
}

/// Decompose `old` and `new` into prefix / differing middle / suffix.
/// Returns `None` when the lines are identical.
pub fn trisect(old: &str, new: &str) -> Option<Trisection> {
    if old == new {
        return None;
    }
    let o: Vec<char> = old.chars().collect();
    let n: Vec<char> = new.chars().collect();

    let mut p = 0usize;
    while p < o.len() && p < n.len() && o[p] == n[p] {
        p += 1;
    }
    let mut s = 0usize;
    while s < o.len() - p && s < n.len() - p && o[o.len() - 1 - s] == n[n.len() - 1 - s] {
        s += 1;
    }

    let collect = |cs: &[char]| cs.iter().collect::<String>();
    let prefix = collect(&o[..p]);
    let old_mid = collect(&o[p..o.len() - s]);
    let new_mid = collect(&n[p..n.len() - s]);
    let suffix = collect(&o[o.len() - s..]);

    Some(Trisection {
        prefix_cells: str_width(&prefix, 0),
        old_mid_cells: str_width(&old_mid, 0),
        new_mid_cells: str_width(&new_mid, 0),
        suffix_cells: str_width(&suffix, 0),
        old_mid,
        new_mid,
        suffix,
    })
}
