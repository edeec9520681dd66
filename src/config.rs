//! Binding file loading and validation.
//!
//! One binding per line:
//!
//! ```text
//! # comment
//! LCtrl+LShift+LAlt+0x50|my-secret-password
//! ```
//!
//! The text after the first `|` is typed verbatim, including leading and
//! trailing spaces. The whole file is validated up front; a single bad
//! line rejects it.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ConfigError, Result, SendInputError};
use crate::modifiers::ModifierMask;
use crate::shortcut::{parse_shortcut, Shortcut};

const COMMENT_PREFIX: char = '#';
const FIELD_DELIMITER: char = '|';
const UTF8_BOM: char = '\u{feff}';

/// A shortcut key bound to the text it types.
#[derive(Clone, PartialEq, Eq)]
pub struct ShortcutBinding {
    shortcut: Shortcut,
    payload: String,
    line_number: usize,
}

impl ShortcutBinding {
    pub fn new(shortcut: Shortcut, payload: impl Into<String>, line_number: usize) -> Self {
        Self {
            shortcut,
            payload: payload.into(),
            line_number,
        }
    }

    pub fn shortcut(&self) -> Shortcut {
        self.shortcut
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// 1-based line of the binding file this entry was read from.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn matches(&self, modifiers: ModifierMask, vk_code: u32) -> bool {
        self.shortcut.modifiers == modifiers && u32::from(self.shortcut.vk_code) == vk_code
    }
}

// Payloads are usually passwords.
impl fmt::Debug for ShortcutBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutBinding")
            .field("shortcut", &self.shortcut.to_string())
            .field("payload", &format_args!("<{} chars>", self.payload.chars().count()))
            .field("line_number", &self.line_number)
            .finish()
    }
}

/// Redacted view of a binding, used by `--check` output.
#[derive(Debug, Clone, Serialize)]
pub struct BindingSummary {
    pub entry: usize,
    pub line: usize,
    pub shortcut: String,
    pub payload_chars: usize,
}

/// Ordered, duplicate-free set of bindings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<ShortcutBinding>,
}

impl BindingTable {
    /// Load and validate a binding file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)
            .map_err(|e| SendInputError::config_path(path, format!("file not found: {e}")))?;
        if metadata.is_dir() {
            return Err(SendInputError::config_path(path, "path is a directory"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SendInputError::config_path(path, format!("cannot read file: {e}")))?;
        let table = Self::parse_str(&content).map_err(|e| SendInputError::config(path, e))?;

        debug!(
            path = %path.display(),
            bindings = table.len(),
            "binding file loaded"
        );
        Ok(table)
    }

    /// Parse the contents of a binding file.
    pub fn parse_str(content: &str) -> std::result::Result<Self, ConfigError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let mut bindings = Vec::new();

        for (index, raw_line) in split_lines(content).enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim_start();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let (shortcut_text, payload) =
                line.split_once(FIELD_DELIMITER)
                    .ok_or_else(|| ConfigError::MissingDelimiter {
                        line_number,
                        line: raw_line.to_string(),
                    })?;

            let shortcut_text = shortcut_text.trim();
            if shortcut_text.is_empty() {
                return Err(ConfigError::EmptyShortcut {
                    line_number,
                    line: raw_line.to_string(),
                });
            }
            if payload.is_empty() {
                return Err(ConfigError::EmptyPayload {
                    line_number,
                    line: raw_line.to_string(),
                });
            }

            let shortcut = parse_shortcut(shortcut_text).map_err(|source| ConfigError::Shortcut {
                line_number,
                line: raw_line.to_string(),
                source,
            })?;

            bindings.push(ShortcutBinding::new(shortcut, payload, line_number));
        }

        if bindings.is_empty() {
            return Err(ConfigError::NoBindings);
        }

        check_duplicates(&bindings)?;
        Ok(Self { bindings })
    }

    /// The binding whose modifiers and key code exactly equal the given state.
    pub fn find(&self, modifiers: ModifierMask, vk_code: u32) -> Option<&ShortcutBinding> {
        self.find_entry(modifiers, vk_code).map(|(_, binding)| binding)
    }

    /// Like [`find`](Self::find), also returning the 1-based entry index.
    pub fn find_entry(
        &self,
        modifiers: ModifierMask,
        vk_code: u32,
    ) -> Option<(usize, &ShortcutBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .find(|(_, binding)| binding.matches(modifiers, vk_code))
            .map(|(index, binding)| (index + 1, binding))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShortcutBinding> {
        self.bindings.iter()
    }

    /// Pretty-printed JSON array of [`summaries`](Self::summaries).
    pub fn summaries_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summaries())?)
    }

    pub fn summaries(&self) -> Vec<BindingSummary> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| BindingSummary {
                entry: index + 1,
                line: binding.line_number,
                shortcut: binding.shortcut.to_string(),
                payload_chars: binding.payload.chars().count(),
            })
            .collect()
    }
}

/// Split on `\r\n` if the file contains one anywhere, otherwise on `\n`.
///
/// Files mixing both endings are not normalised.
fn split_lines(content: &str) -> std::str::Split<'_, &'static str> {
    let delimiter = if content.contains("\r\n") { "\r\n" } else { "\n" };
    content.split(delimiter)
}

fn check_duplicates(bindings: &[ShortcutBinding]) -> std::result::Result<(), ConfigError> {
    for (i, first) in bindings.iter().enumerate() {
        for (j, second) in bindings.iter().enumerate().skip(i + 1) {
            if first.shortcut == second.shortcut {
                return Err(ConfigError::DuplicateBinding {
                    first: i + 1,
                    second: j + 1,
                    first_line: first.line_number,
                    second_line: second.line_number,
                    shortcut: first.shortcut.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_binding() {
        let table = BindingTable::parse_str("LCtrl+LShift+LAlt+0x50|my-secret-password").unwrap();
        assert_eq!(table.len(), 1);

        let binding = table.iter().next().unwrap();
        assert_eq!(binding.shortcut().to_string(), "LCtrl+LShift+LAlt+0x50");
        assert_eq!(binding.payload(), "my-secret-password");
        assert_eq!(binding.line_number(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let content = "# usernames\n\n   \n  # indented comment\nLCtrl+0x41|alice\n";
        let table = BindingTable::parse_str(content).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().line_number(), 5);
    }

    #[test]
    fn test_payload_is_verbatim() {
        let table = BindingTable::parse_str("  LCtrl + 0x41 |  pass|word  \n").unwrap();
        let binding = table.iter().next().unwrap();
        assert_eq!(binding.payload(), "  pass|word  ");
    }

    #[test]
    fn test_crlf_line_endings() {
        let table = BindingTable::parse_str("LCtrl+0x41|alice\r\nLCtrl+0x42|bob\r\n").unwrap();
        let payloads: Vec<_> = table.iter().map(|b| b.payload()).collect();
        assert_eq!(payloads, vec!["alice", "bob"]);
    }

    #[test]
    fn test_lf_line_endings() {
        let table = BindingTable::parse_str("LCtrl+0x41|alice\nLCtrl+0x42|bob").unwrap();
        let payloads: Vec<_> = table.iter().map(|b| b.payload()).collect();
        assert_eq!(payloads, vec!["alice", "bob"]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let table = BindingTable::parse_str("\u{feff}LCtrl+0x41|alice").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_delimiter() {
        let err = BindingTable::parse_str("LCtrl+0x41|alice\n  LCtrl+0x42 bob").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDelimiter {
                line_number: 2,
                line: "  LCtrl+0x42 bob".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_fields() {
        assert!(matches!(
            BindingTable::parse_str("  |alice").unwrap_err(),
            ConfigError::EmptyShortcut { line_number: 1, .. }
        ));
        assert!(matches!(
            BindingTable::parse_str("LCtrl+0x41|").unwrap_err(),
            ConfigError::EmptyPayload { line_number: 1, .. }
        ));
    }

    #[test]
    fn test_shortcut_error_carries_line() {
        let err = BindingTable::parse_str("# header\nCtrl+0x41|alice").unwrap_err();
        match err {
            ConfigError::Shortcut {
                line_number,
                line,
                source,
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "Ctrl+0x41|alice");
                assert!(matches!(source, crate::error::ParseError::AmbiguousModifier { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_bindings() {
        assert_eq!(BindingTable::parse_str("").unwrap_err(), ConfigError::NoBindings);
        assert_eq!(
            BindingTable::parse_str("# only comments\n\n").unwrap_err(),
            ConfigError::NoBindings
        );
    }

    #[test]
    fn test_duplicate_bindings() {
        let err = BindingTable::parse_str("LCtrl+0x41|alice\nlctrl+0X41|bob").unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateBinding {
                first: 1,
                second: 2,
                first_line: 1,
                second_line: 2,
                shortcut: "LCtrl+0x41".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_entries_are_numbered_by_entry() {
        let content = "# c\nLCtrl+0x41|a\nLCtrl+0x42|b\n\nLCtrl+0x42|c";
        match BindingTable::parse_str(content).unwrap_err() {
            ConfigError::DuplicateBinding {
                first,
                second,
                first_line,
                second_line,
                ..
            } => {
                assert_eq!((first, second), (2, 3));
                assert_eq!((first_line, second_line), (3, 5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_find_is_exact() {
        let table = BindingTable::parse_str("LCtrl+LShift+0x41|alice\nLCtrl+0x41|bob").unwrap();

        let both = ModifierMask::CTRL_LEFT | ModifierMask::SHIFT_LEFT;
        assert_eq!(table.find(both, 0x41).map(|b| b.payload()), Some("alice"));
        assert_eq!(
            table.find(ModifierMask::CTRL_LEFT, 0x41).map(|b| b.payload()),
            Some("bob")
        );
        assert!(table.find(both | ModifierMask::CTRL_RIGHT, 0x41).is_none());
        assert!(table.find(ModifierMask::SHIFT_LEFT, 0x41).is_none());
        assert!(table.find(both, 0x42).is_none());
    }

    #[test]
    fn test_debug_redacts_payload() {
        let table = BindingTable::parse_str("LCtrl+0x41|hunter2").unwrap();
        let debug = format!("{table:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<7 chars>"));
    }

    #[test]
    fn test_summaries_json_is_redacted() {
        let table = BindingTable::parse_str("LCtrl+0x41|hunter2\nRAlt+0x42|bob").unwrap();
        let json = table.summaries_json().unwrap();
        assert!(!json.contains("hunter2"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["shortcut"], "LCtrl+0x41");
        assert_eq!(parsed[0]["payload_chars"], 7);
        assert_eq!(parsed[1]["line"], 2);
    }

    #[test]
    fn test_summaries() {
        let table = BindingTable::parse_str("# c\nLCtrl+0x41|alice\nRAlt+0x42|bob").unwrap();
        let summaries = table.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].entry, 2);
        assert_eq!(summaries[1].line, 3);
        assert_eq!(summaries[1].shortcut, "RAlt+0x42");
        assert_eq!(summaries[1].payload_chars, 3);
    }
}
