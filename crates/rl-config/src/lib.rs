//! Editor variables: typed storage with a readline-style string API.
//!
//! Variables load from `oxline.toml` (working directory first, then the
//! platform config dir). A missing or unparseable file falls back to
//! defaults so a broken config never prevents line editing. On top of the
//! typed fields, `get`/`set` accept the traditional kebab-case variable
//! names so hosts can surface a `set name value` command without knowing
//! the field list.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// How attention is drawn on errors and failed searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BellStyle {
    None,
    Off,
    #[default]
    Audible,
    Visible,
    On,
}

impl BellStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(BellStyle::None),
            "off" => Some(BellStyle::Off),
            "audible" => Some(BellStyle::Audible),
            "visible" => Some(BellStyle::Visible),
            "on" => Some(BellStyle::On),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BellStyle::None => "none",
            BellStyle::Off => "off",
            BellStyle::Audible => "audible",
            BellStyle::Visible => "visible",
            BellStyle::On => "on",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Variables {
    pub bell_style: BellStyle,
    pub prefer_visible_bell: bool,
    /// Milliseconds to wait for a key sequence to continue before the ESC
    /// prefix is resolved on its own.
    pub keyseq_timeout: u64,
    pub comment_begin: String,
    pub completion_query_items: usize,
    pub page_completions: bool,
    pub disable_completion: bool,
    pub bind_tty_special_chars: bool,
    pub disable_history: bool,
    pub disable_event_expansion: bool,
    /// Code points that end an incremental search when typed.
    pub search_terminators: String,
    pub copy_paste_detection: bool,
}

impl Default for Variables {
    fn default() -> Self {
        Self {
            bell_style: BellStyle::Audible,
            prefer_visible_bell: false,
            keyseq_timeout: 500,
            comment_begin: "#".to_string(),
            completion_query_items: 100,
            page_completions: true,
            disable_completion: false,
            bind_tty_special_chars: true,
            disable_history: false,
            disable_event_expansion: false,
            search_terminators: "\u{1b}\n".to_string(),
            copy_paste_detection: false,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn bool_str(v: bool) -> String {
    if v { "on" } else { "off" }.to_string()
}

impl Variables {
    /// Read a variable by its kebab-case name.
    pub fn get(&self, name: &str) -> Option<String> {
        let v = match name {
            "bell-style" => self.bell_style.as_str().to_string(),
            "prefer-visible-bell" => bool_str(self.prefer_visible_bell),
            "keyseq-timeout" => self.keyseq_timeout.to_string(),
            "comment-begin" => self.comment_begin.clone(),
            "completion-query-items" => self.completion_query_items.to_string(),
            "page-completions" => bool_str(self.page_completions),
            "disable-completion" => bool_str(self.disable_completion),
            "bind-tty-special-chars" => bool_str(self.bind_tty_special_chars),
            "disable-history" => bool_str(self.disable_history),
            "disable-event-expansion" => bool_str(self.disable_event_expansion),
            "search-terminators" => self.search_terminators.clone(),
            "copy-paste-detection" => bool_str(self.copy_paste_detection),
            _ => return None,
        };
        Some(v)
    }

    /// Assign a variable by name, parsing the value. Unknown names and
    /// unparseable values are errors.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        macro_rules! flag {
            ($field:ident) => {{
                match parse_bool(value) {
                    Some(b) => self.$field = b,
                    None => bail!("invalid boolean for {name}: {value}"),
                }
            }};
        }
        match name {
            "bell-style" => match BellStyle::parse(value) {
                Some(style) => self.bell_style = style,
                None => bail!("invalid bell-style: {value}"),
            },
            "prefer-visible-bell" => flag!(prefer_visible_bell),
            "keyseq-timeout" => self.keyseq_timeout = value.parse()?,
            "comment-begin" => self.comment_begin = value.to_string(),
            "completion-query-items" => self.completion_query_items = value.parse()?,
            "page-completions" => flag!(page_completions),
            "disable-completion" => flag!(disable_completion),
            "bind-tty-special-chars" => flag!(bind_tty_special_chars),
            "disable-history" => flag!(disable_history),
            "disable-event-expansion" => flag!(disable_event_expansion),
            "search-terminators" => self.search_terminators = value.to_string(),
            "copy-paste-detection" => flag!(copy_paste_detection),
            _ => bail!("unknown variable: {name}"),
        }
        Ok(())
    }

    /// Whether a code point terminates an incremental search.
    pub fn is_search_terminator(&self, ch: char) -> bool {
        self.search_terminators.contains(ch)
    }
}

/// Best-effort config path: working directory first, then the platform
/// config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("oxline.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxline").join("oxline.toml");
    }
    PathBuf::from("oxline.toml")
}

/// Load variables from `path` (or the discovered location). Missing file or
/// parse failure falls back to defaults.
pub fn load_from(path: Option<PathBuf>) -> Variables {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Variables>(&content) {
            Ok(vars) => {
                info!(target: "config", path = %path.display(), "loaded");
                vars
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "parse_failed_using_defaults");
                Variables::default()
            }
        },
        Err(_) => Variables::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let v = Variables::default();
        assert_eq!(v.bell_style, BellStyle::Audible);
        assert_eq!(v.keyseq_timeout, 500);
        assert_eq!(v.completion_query_items, 100);
        assert_eq!(v.comment_begin, "#");
        assert!(v.is_search_terminator('\u{1b}'));
        assert!(v.is_search_terminator('\n'));
        assert!(!v.is_search_terminator('a'));
    }

    #[test]
    fn default_when_missing_file() {
        let v = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml")));
        assert_eq!(v.keyseq_timeout, 500);
    }

    #[test]
    fn parses_toml_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "bell-style = \"visible\"\nkeyseq-timeout = 50\ndisable-history = true\n",
        )
        .unwrap();
        let v = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(v.bell_style, BellStyle::Visible);
        assert_eq!(v.keyseq_timeout, 50);
        assert!(v.disable_history);
        // Unspecified fields keep defaults.
        assert_eq!(v.completion_query_items, 100);
    }

    #[test]
    fn broken_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "keyseq-timeout = \"not a number").unwrap();
        let v = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(v.keyseq_timeout, 500);
    }

    #[test]
    fn string_api_round_trips() {
        let mut v = Variables::default();
        v.set("bell-style", "none").unwrap();
        assert_eq!(v.get("bell-style").as_deref(), Some("none"));
        v.set("keyseq-timeout", "250").unwrap();
        assert_eq!(v.get("keyseq-timeout").as_deref(), Some("250"));
        v.set("page-completions", "off").unwrap();
        assert_eq!(v.get("page-completions").as_deref(), Some("off"));
    }

    #[test]
    fn unknown_variable_rejected() {
        let mut v = Variables::default();
        assert!(v.set("no-such-thing", "on").is_err());
        assert!(v.get("no-such-thing").is_none());
        assert!(v.set("bell-style", "loud").is_err());
        assert!(v.set("keyseq-timeout", "soon").is_err());
    }
}
