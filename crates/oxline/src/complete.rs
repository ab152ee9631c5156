//! Tab completion: candidate gathering, common-prefix insertion, and the
//! candidate listing with query prompt and `--More--` paging.
//!
//! Completers are consulted in order; the first that produces candidates
//! wins and names the char position its candidates replace from. A single
//! candidate splices in. Several first extend the common prefix; when no
//! further progress is possible the candidates print into scrollback in
//! width-balanced columns and the edit line repaints below them.

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use rl_text::width::str_width;

use crate::{Editor, messages};

pub(crate) fn complete(ed: &mut Editor) -> Result<bool> {
    if ed.vars.disable_completion {
        ed.buf.insert_char('\t');
        return Ok(true);
    }
    // Mid-paste TABs are content, not completion requests.
    if ed.vars.copy_paste_detection
        && matches!(
            ed.port.peek_key(Duration::from_millis(0))?,
            rl_terminal::KeyRead::Char(_)
        )
    {
        ed.buf.insert_char('\t');
        return Ok(true);
    }

    let Some((pos, candidates)) = gather(ed) else {
        return Ok(false);
    };
    let cursor = ed.buf.cursor();

    if candidates.len() == 1 {
        ed.buf.delete_range(pos, cursor);
        ed.buf.set_cursor(pos);
        ed.buf.insert(&candidates[0]);
        return Ok(true);
    }

    // Extend by the common prefix when that makes progress.
    let prefix = common_prefix(&candidates);
    let typed = cursor - pos;
    if prefix.chars().count() > typed {
        ed.buf.delete_range(pos, cursor);
        ed.buf.set_cursor(pos);
        ed.buf.insert(&prefix);
        return Ok(true);
    }

    print_candidates(ed, &candidates)?;
    Ok(true)
}

pub(crate) fn possible_completions(ed: &mut Editor) -> Result<bool> {
    let Some((_, candidates)) = gather(ed) else {
        return Ok(false);
    };
    print_candidates(ed, &candidates)?;
    Ok(true)
}

fn gather(ed: &mut Editor) -> Option<(usize, Vec<String>)> {
    let line = ed.buf.to_line();
    let cursor = ed.buf.cursor();
    let mut candidates = Vec::new();
    for completer in &ed.completers {
        candidates.clear();
        if let Some(pos) = completer.complete(&line, cursor, &mut candidates)
            && !candidates.is_empty()
        {
            debug!(target: "complete", count = candidates.len(), pos, "candidates");
            return Some((pos.min(cursor), candidates));
        }
    }
    None
}

fn common_prefix(candidates: &[String]) -> String {
    let mut prefix = candidates[0].clone();
    for cand in &candidates[1..] {
        let keep = prefix
            .chars()
            .zip(cand.chars())
            .take_while(|(a, b)| a == b)
            .count();
        prefix = prefix.chars().take(keep).collect();
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}

/// Print candidates into scrollback, honoring the query threshold and the
/// pager, then schedule a full repaint of the edit line below them.
fn print_candidates(ed: &mut Editor, candidates: &[String]) -> Result<()> {
    if candidates.len() >= ed.vars.completion_query_items {
        if !query_display(ed, candidates.len())? {
            return Ok(());
        }
    }

    let rows = column_rows(candidates, ed.cols as usize);
    let page_rows = (ed.rows as usize).saturating_sub(2).max(1);
    ed.port.write_text("\r\n")?;
    for (i, row) in rows.iter().enumerate() {
        if ed.vars.page_completions && i > 0 && i % page_rows == 0 && !more_prompt(ed)? {
            break;
        }
        ed.port.write_text(row)?;
        ed.port.write_text("\r\n")?;
    }
    ed.redisplay.invalidate();
    ed.redisplay_now()?;
    ed.port.flush()?;
    Ok(())
}

/// `Display all N possibilities? (y or n)` — only the first letter of the
/// localized tokens is accepted; anything else beeps.
fn query_display(ed: &mut Editor, n: usize) -> Result<bool> {
    let prompt = messages::format("display-candidates", n);
    ed.port.write_text("\r\n")?;
    ed.port.write_text(&prompt)?;
    ed.port.flush()?;
    let yes = first_letter(messages::lookup("display-candidates-yes"));
    let no = first_letter(messages::lookup("display-candidates-no"));
    let answer = loop {
        let Some(ch) = ed.read_raw_char()? else {
            break false;
        };
        if ch.eq_ignore_ascii_case(&yes) {
            break true;
        }
        if ch.eq_ignore_ascii_case(&no) {
            break false;
        }
        ed.beep()?;
    };
    if !answer {
        // Nothing listed: repaint the edit line fresh.
        ed.port.write_text("\r\n")?;
        ed.redisplay.invalidate();
        ed.redisplay_now()?;
        ed.port.flush()?;
    }
    Ok(answer)
}

fn first_letter(token: &str) -> char {
    token.chars().next().unwrap_or('y')
}

/// `--More--` pause between pages. Space or enter continue; q and delete
/// abort the listing.
fn more_prompt(ed: &mut Editor) -> Result<bool> {
    let more = messages::lookup("display-more");
    ed.port.write_text(more)?;
    ed.port.flush()?;
    let go_on = loop {
        let Some(ch) = ed.read_raw_char()? else {
            break false;
        };
        match ch {
            ' ' | '\r' | '\n' => break true,
            'q' | 'Q' | '\u{7f}' => break false,
            _ => ed.beep()?,
        }
    };
    // Erase the pager prompt.
    ed.port.write_text("\r")?;
    ed.port
        .write_text(&" ".repeat(str_width(more, 0)))?;
    ed.port.write_text("\r")?;
    Ok(go_on)
}

/// Pack candidates into rows of padded columns fitting `width` cells.
fn column_rows(candidates: &[String], width: usize) -> Vec<String> {
    let col_width = candidates
        .iter()
        .map(|c| str_width(c, 0))
        .max()
        .unwrap_or(1)
        + 2;
    let per_row = (width / col_width).max(1);
    let mut rows = Vec::new();
    for chunk in candidates.chunks(per_row) {
        let mut row = String::new();
        for (i, cand) in chunk.iter().enumerate() {
            row.push_str(cand);
            if i + 1 < chunk.len() {
                let pad = col_width - str_width(cand, 0);
                row.push_str(&" ".repeat(pad));
            }
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_of_candidates() {
        let cands = vec!["remove".to_string(), "remote".to_string(), "remark".to_string()];
        assert_eq!(common_prefix(&cands), "rem");
        assert_eq!(common_prefix(&["abc".to_string()]), "abc");
        assert_eq!(
            common_prefix(&["x".to_string(), "y".to_string()]),
            ""
        );
    }

    #[test]
    fn columns_fit_width() {
        let cands: Vec<String> = (0..8).map(|i| format!("cand{i}")).collect();
        let rows = column_rows(&cands, 40);
        // 5-wide names + 2 padding = 7; 40 / 7 = 5 per row.
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| str_width(r, 0) <= 40));
    }

    #[test]
    fn single_column_when_narrow() {
        let cands = vec!["averylongcandidate".to_string(), "another".to_string()];
        let rows = column_rows(&cands, 10);
        assert_eq!(rows.len(), 2);
    }
}
