//! Property tests for layout packing and line diff trisection.

use proptest::prelude::*;
use rl_render::diff::trisect;
use rl_render::layout;
use rl_text::width::str_width;

proptest! {
    #[test]
    fn lines_never_exceed_width(text in "[ -~]{0,120}", cols in 2usize..80) {
        let l = layout(&text, cols, 0);
        for line in &l.lines {
            prop_assert!(str_width(line, 0) <= cols);
        }
    }

    #[test]
    fn printable_ascii_round_trips(text in "[ -~]{0,120}", cols in 2usize..80) {
        // Printable ASCII has no tabs, controls or wide glyphs, so packing
        // inserts no padding and the concatenation is the original text.
        let l = layout(&text, cols, 0);
        let joined: String = l.lines.concat();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn cursor_cell_is_within_frame(text in "[ -~]{0,120}", cols in 2usize..80, at in 0usize..140) {
        let l = layout(&text, cols, at);
        prop_assert!(l.cursor_cell <= l.lines.len() * cols);
    }

    #[test]
    fn trisection_reconstructs_both_lines(old in "[ -~]{0,60}", new in "[ -~]{0,60}") {
        match trisect(&old, &new) {
            None => prop_assert_eq!(&old, &new),
            Some(t) => {
                let old_chars: Vec<char> = old.chars().collect();
                let keep = old_chars.len() - t.old_mid.chars().count() - t.suffix.chars().count();
                let prefix: String = old_chars[..keep].iter().collect();
                prop_assert_eq!(format!("{prefix}{}{}", t.old_mid, t.suffix), old);
                prop_assert_eq!(format!("{prefix}{}{}", t.new_mid, t.suffix), new);
            }
        }
    }
}
