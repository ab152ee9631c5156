//! oxline demo REPL.
//!
//! Reads lines in a loop and echoes them back, exercising history, search,
//! completion and the vi/emacs maps. CTRL-C shows `^C` and continues;
//! CTRL-D on an empty line exits.

use anyhow::Result;
use clap::Parser;
use oxline::{Completer, Editor, ReadError};
use rl_terminal::CrosstermConsole;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxline-demo", version, about = "oxline line editor demo")]
struct Args {
    /// Start in vi editing mode instead of emacs.
    #[arg(long)]
    vi: bool,
    /// Mask typed characters with this character (password entry).
    #[arg(long)]
    mask: Option<char>,
    /// Configuration file path (overrides discovery of `oxline.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Append tracing output to this file.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Completes a fixed word list, enough to show the candidate UI.
struct WordCompleter {
    words: Vec<&'static str>,
}

impl Completer for WordCompleter {
    fn complete(&self, line: &str, cursor: usize, candidates: &mut Vec<String>) -> Option<usize> {
        let chars: Vec<char> = line.chars().collect();
        let mut start = cursor;
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let word: String = chars[start..cursor].iter().collect();
        candidates.extend(
            self.words
                .iter()
                .filter(|w| w.starts_with(&word))
                .map(|w| w.to_string()),
        );
        if candidates.is_empty() { None } else { Some(start) }
    }
}

fn configure_logging(path: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log_file.as_ref())?;
    info!(target: "runtime", vi = args.vi, "startup");

    let mut editor = Editor::new(Box::new(CrosstermConsole::new()));
    if let Some(path) = args.config {
        editor = editor.with_config(path);
    }
    if args.vi {
        editor.set_keymap("vi-insert");
    }
    editor.add_completer(Box::new(WordCompleter {
        words: vec![
            "cargo", "check", "clippy", "commit", "history", "search", "status", "test",
        ],
    }));

    loop {
        match editor.read_line_masked("oxline> ", args.mask) {
            Ok(line) if line == "exit" => break,
            Ok(line) => {
                if !line.is_empty() {
                    println!("{line}");
                }
            }
            Err(ReadError::Interrupted(_)) => {
                println!("^C");
            }
            Err(ReadError::Eof) => break,
            Err(ReadError::Terminal(e)) => return Err(e),
        }
    }
    Ok(())
}
