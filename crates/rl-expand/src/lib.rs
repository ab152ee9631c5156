//! History event expansion.
//!
//! Rewrites an accepted line before it is added to history, resolving the
//! `!` event designators and the leading `^old^new^` quick substitution.
//! Rules are applied in one left-to-right pass; text produced by an earlier
//! designator is visible to a later `!#` but is not itself re-expanded.
//!
//! Failed lookups surface as `ExpandError::EventNotFound`; the editor
//! recovers locally (beep, clear, empty line) rather than propagating.

use rl_state::History;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("{0}: event not found")]
    EventNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    pub changed: bool,
}

fn previous_entry<'h>(history: &'h History, designator: &str) -> Result<&'h str, ExpandError> {
    if history.index() == 0 {
        return Err(ExpandError::EventNotFound(designator.to_string()));
    }
    history
        .get(history.index() - 1)
        .ok_or_else(|| ExpandError::EventNotFound(designator.to_string()))
}

/// Expand all event designators in `line` against `history`.
pub fn expand(line: &str, history: &History) -> Result<Expansion, ExpandError> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut i = 0usize;

    // Quick substitution applies only at the very start of the line; a
    // leading backslash escapes it.
    if chars.first() == Some(&'\\') && chars.get(1) == Some(&'^') {
        out.push('^');
        i = 2;
    } else if chars.first() == Some(&'^') {
        i = quick_substitution(&chars, history, &mut out)?;
    }

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' if chars.get(i + 1) == Some(&'!') => {
                out.push('!');
                i += 2;
            }
            '!' => i = designator(&chars, i, history, &mut out)?,
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    let changed = out != line;
    if changed {
        debug!(target: "expand", from = line, to = out.as_str(), "expanded");
    }
    Ok(Expansion { text: out, changed })
}

/// Parse `^old^new^` (trailing `^` optional); returns the resume index.
fn quick_substitution(
    chars: &[char],
    history: &History,
    out: &mut String,
) -> Result<usize, ExpandError> {
    let text: String = chars.iter().collect();
    let mut parts = text[1..].splitn(3, '^');
    let old = parts.next().unwrap_or("");
    let new = match parts.next() {
        Some(n) => n,
        None => return Err(ExpandError::EventNotFound(text)),
    };
    let rest = parts.next().unwrap_or("");

    let prev = previous_entry(history, &text)?;
    if old.is_empty() || !prev.contains(old) {
        return Err(ExpandError::EventNotFound(format!("^{old}^{new}^")));
    }
    out.push_str(&prev.replacen(old, new, 1));
    out.push_str(rest);
    Ok(chars.len())
}

/// Expand one `!` designator starting at `chars[at]`; returns the index of
/// the first unconsumed character.
fn designator(
    chars: &[char],
    at: usize,
    history: &History,
    out: &mut String,
) -> Result<usize, ExpandError> {
    let next = match chars.get(at + 1) {
        Some(c) => *c,
        None => {
            // A trailing bang is literal.
            out.push('!');
            return Ok(at + 1);
        }
    };
    match next {
        ' ' | '\t' => {
            out.push('!');
            out.push(next);
            Ok(at + 2)
        }
        '!' => {
            out.push_str(previous_entry(history, "!!")?);
            Ok(at + 2)
        }
        '#' => {
            // The line assembled so far, excluding this token.
            let so_far = out.clone();
            out.push_str(&so_far);
            Ok(at + 2)
        }
        '$' => {
            let prev = previous_entry(history, "!$")?;
            if let Some(word) = prev.split_whitespace().last() {
                out.push_str(word);
            }
            Ok(at + 2)
        }
        '?' => {
            let mut term = String::new();
            let mut j = at + 2;
            while j < chars.len() && chars[j] != '?' {
                term.push(chars[j]);
                j += 1;
            }
            let closed = j < chars.len();
            let idx = history
                .search_backward(&term, history.index())
                .ok_or_else(|| ExpandError::EventNotFound(term.clone()))?;
            out.push_str(history.get(idx).unwrap_or(""));
            Ok(if closed { j + 1 } else { j })
        }
        '-' => {
            let (n, j) = read_number(chars, at + 2)
                .ok_or_else(|| ExpandError::EventNotFound("!-".to_string()))?;
            let designator = format!("!-{n}");
            if n == 0 || n > history.index() {
                return Err(ExpandError::EventNotFound(designator));
            }
            let idx = history.index() - n;
            out.push_str(
                history
                    .get(idx)
                    .ok_or(ExpandError::EventNotFound(designator))?,
            );
            Ok(j)
        }
        c if c.is_ascii_digit() => {
            let (n, j) = read_number(chars, at + 1).expect("digit present");
            out.push_str(
                history
                    .get(n)
                    .ok_or_else(|| ExpandError::EventNotFound(format!("!{n}")))?,
            );
            Ok(j)
        }
        _ => {
            // Prefix designator: everything up to the next whitespace.
            let mut prefix = String::new();
            let mut j = at + 1;
            while j < chars.len() && !chars[j].is_whitespace() {
                prefix.push(chars[j]);
                j += 1;
            }
            let idx = history
                .search_prefix_backward(&prefix, history.index())
                .ok_or_else(|| ExpandError::EventNotFound(prefix.clone()))?;
            out.push_str(history.get(idx).unwrap_or(""));
            Ok(j)
        }
    }
}

fn read_number(chars: &[char], from: usize) -> Option<(usize, usize)> {
    let mut j = from;
    let mut n = 0usize;
    let mut seen = false;
    while j < chars.len() && chars[j].is_ascii_digit() {
        n = n.saturating_mul(10) + (chars[j] as usize - '0' as usize);
        j += 1;
        seen = true;
    }
    seen.then_some((n, j))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(lines: &[&str]) -> History {
        let mut h = History::default();
        for l in lines {
            h.add(l);
        }
        h
    }

    fn ok(line: &str, h: &History) -> Expansion {
        expand(line, h).unwrap()
    }

    #[test]
    fn plain_lines_pass_through() {
        let h = hist(&["echo foo"]);
        let e = ok("ls -la", &h);
        assert_eq!(e.text, "ls -la");
        assert!(!e.changed);
    }

    #[test]
    fn bang_bang_is_previous_entry() {
        let h = hist(&["echo foo"]);
        let e = ok("!!", &h);
        assert_eq!(e.text, "echo foo");
        assert!(e.changed);
        assert_eq!(ok("sudo !!", &h).text, "sudo echo foo");
    }

    #[test]
    fn bang_bang_without_history_fails() {
        let h = History::default();
        assert_eq!(
            expand("!!", &h),
            Err(ExpandError::EventNotFound("!!".to_string()))
        );
    }

    #[test]
    fn escaped_bang_is_literal() {
        let h = hist(&["echo foo"]);
        assert_eq!(ok("say \\!!", &h).text, "say !!");
    }

    #[test]
    fn bang_space_is_literal() {
        let h = hist(&["echo foo"]);
        assert_eq!(ok("a ! b", &h).text, "a ! b");
        assert_eq!(ok("end!", &h).text, "end!");
    }

    #[test]
    fn absolute_and_relative_indices() {
        let h = hist(&["zero", "one", "two"]);
        assert_eq!(ok("!0", &h).text, "zero");
        assert_eq!(ok("!2", &h).text, "two");
        assert_eq!(ok("!-1", &h).text, "two");
        assert_eq!(ok("!-3", &h).text, "zero");
        assert_eq!(
            expand("!9", &h),
            Err(ExpandError::EventNotFound("!9".to_string()))
        );
        assert_eq!(
            expand("!-4", &h),
            Err(ExpandError::EventNotFound("!-4".to_string()))
        );
    }

    #[test]
    fn substring_and_prefix_search() {
        let h = hist(&["echo alpha", "grep beta", "echo gamma"]);
        assert_eq!(ok("!?beta?", &h).text, "grep beta");
        assert_eq!(ok("!?alpha? again", &h).text, "echo alpha again");
        assert_eq!(ok("!echo", &h).text, "echo gamma");
        assert_eq!(ok("!grep x", &h).text, "grep beta x");
        assert_eq!(
            expand("!?zzz?", &h),
            Err(ExpandError::EventNotFound("zzz".to_string()))
        );
    }

    #[test]
    fn last_word_designator() {
        let h = hist(&["cp a.txt b.txt"]);
        assert_eq!(ok("rm !$", &h).text, "rm b.txt");
    }

    #[test]
    fn builder_so_far_designator() {
        let h = hist(&["echo foo"]);
        // `!#` repeats the expansion output built so far, prefix only.
        assert_eq!(ok("abc!#", &h).text, "abcabc");
        assert_eq!(ok("!!-!#", &h).text, "echo foo-echo foo-");
    }

    #[test]
    fn quick_substitution() {
        let h = hist(&["echo foo"]);
        let e = ok("^foo^bar^", &h);
        assert_eq!(e.text, "echo bar");
        assert_eq!(ok("^foo^bar", &h).text, "echo bar");
        assert_eq!(
            expand("^zzz^bar^", &h),
            Err(ExpandError::EventNotFound("^zzz^bar^".to_string()))
        );
    }

    #[test]
    fn escaped_leading_caret() {
        let h = hist(&["echo foo"]);
        assert_eq!(ok("\\^up", &h).text, "^up");
        // Caret not at line start is literal.
        assert_eq!(ok("a^b", &h).text, "a^b");
    }

    #[test]
    fn expansion_is_idempotent_without_designators() {
        let h = hist(&["echo foo"]);
        let once = ok("plain text, no events", &h);
        let twice = ok(&once.text, &h);
        assert_eq!(once.text, twice.text);
        assert!(!twice.changed);
    }
}
