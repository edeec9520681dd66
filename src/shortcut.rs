//! Shortcut key grammar.
//!
//! A shortcut is one or more sided modifier names followed by a
//! hexadecimal virtual key code, joined by `+`:
//!
//! ```text
//! LCtrl+LShift+LAlt+0x50
//! ```
//!
//! Names and hex digits are matched case-insensitively and every token is
//! whitespace-trimmed. The generic `Shift`, `Ctrl` and `Alt` names are
//! rejected so the author has to pick the physical key.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::ParseError;
use crate::modifiers::{ModifierKey, ModifierMask};

/// Smallest accepted virtual key code.
pub const MIN_VK_CODE: u8 = 0x01;
/// Largest accepted virtual key code.
pub const MAX_VK_CODE: u8 = 0xFE;

/// A parsed shortcut key: an exact modifier set plus one virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub modifiers: ModifierMask,
    pub vk_code: u8,
}

impl Shortcut {
    pub fn new(modifiers: ModifierMask, vk_code: u8) -> Self {
        Self { modifiers, vk_code }
    }
}

/// Renders the canonical form, e.g. `LCtrl+LShift+0x50`.
impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.modifiers.names() {
            write!(f, "{name}+")?;
        }
        write!(f, "0x{:02X}", self.vk_code)
    }
}

impl FromStr for Shortcut {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_shortcut(s)
    }
}

/// Parse a shortcut key such as `LCtrl+LShift+LAlt+0x50`.
///
/// Pure and deterministic; errors carry the complete input and the
/// offending token.
pub fn parse_shortcut(text: &str) -> Result<Shortcut, ParseError> {
    let tokens: Vec<&str> = text.split('+').map(str::trim).collect();
    // split() always yields at least one item
    let (vk_token, modifier_tokens): (&str, &[&str]) = match tokens.split_last() {
        Some((last, rest)) => (*last, rest),
        None => ("", &[]),
    };

    let mut modifiers = ModifierMask::empty();
    for &token in modifier_tokens {
        let key = parse_modifier(text, token)?;
        if modifiers.contains(key.mask()) {
            return Err(ParseError::DuplicateModifier {
                shortcut: text.to_string(),
                token: token.to_string(),
            });
        }
        modifiers |= key.mask();
    }

    if modifiers.is_empty() {
        return Err(ParseError::NoModifiers {
            shortcut: text.to_string(),
        });
    }

    let vk_code = parse_vk_code(text, vk_token)?;
    Ok(Shortcut { modifiers, vk_code })
}

fn parse_modifier(shortcut: &str, token: &str) -> Result<ModifierKey, ParseError> {
    const GENERIC: [&str; 3] = ["Shift", "Ctrl", "Alt"];

    if let Some(canonical) = GENERIC
        .into_iter()
        .find(|generic| generic.eq_ignore_ascii_case(token))
    {
        return Err(ParseError::AmbiguousModifier {
            shortcut: shortcut.to_string(),
            token: token.to_string(),
            canonical,
        });
    }

    ModifierKey::from_name(token).ok_or_else(|| ParseError::UnknownModifier {
        shortcut: shortcut.to_string(),
        token: token.to_string(),
    })
}

fn parse_vk_code(shortcut: &str, token: &str) -> Result<u8, ParseError> {
    let format_error = || ParseError::InvalidVkCodeFormat {
        shortcut: shortcut.to_string(),
        token: token.to_string(),
    };
    let range_error = || ParseError::VkCodeOutOfRange {
        shortcut: shortcut.to_string(),
        token: token.to_string(),
    };

    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .ok_or_else(format_error)?;

    // from_str_radix accepts a leading sign, the grammar does not
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format_error());
    }

    let value = match u64::from_str_radix(digits, 16) {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Err(range_error()),
        Err(_) => return Err(format_error()),
    };

    match u8::try_from(value) {
        Ok(vk_code) if (MIN_VK_CODE..=MAX_VK_CODE).contains(&vk_code) => Ok(vk_code),
        _ => Err(range_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_left_modifiers() {
        let shortcut = parse_shortcut("LCtrl+LShift+LAlt+0x50").unwrap();
        assert_eq!(
            shortcut.modifiers,
            ModifierMask::CTRL_LEFT | ModifierMask::SHIFT_LEFT | ModifierMask::ALT_LEFT
        );
        assert_eq!(shortcut.vk_code, 0x50);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        let shortcut = parse_shortcut(" rctrl + RALT +0Xfe ").unwrap();
        assert_eq!(
            shortcut.modifiers,
            ModifierMask::CTRL_RIGHT | ModifierMask::ALT_RIGHT
        );
        assert_eq!(shortcut.vk_code, 0xFE);
    }

    #[test]
    fn test_generic_modifiers_are_rejected() {
        let err = parse_shortcut("Ctrl+LShift+LAlt+0x50").unwrap_err();
        assert_eq!(
            err,
            ParseError::AmbiguousModifier {
                shortcut: "Ctrl+LShift+LAlt+0x50".to_string(),
                token: "Ctrl".to_string(),
                canonical: "Ctrl",
            }
        );

        let err = parse_shortcut("LCtrl+shift+0x50").unwrap_err();
        assert!(matches!(
            err,
            ParseError::AmbiguousModifier { canonical: "Shift", .. }
        ));
        assert!(err.to_string().contains("Please use [LShift] or [RShift]"));

        assert!(matches!(
            parse_shortcut("ALT+0x50").unwrap_err(),
            ParseError::AmbiguousModifier { canonical: "Alt", .. }
        ));
    }

    #[test]
    fn test_unknown_modifier() {
        let err = parse_shortcut("LCtrl+Win+0x50").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownModifier {
                shortcut: "LCtrl+Win+0x50".to_string(),
                token: "Win".to_string(),
            }
        );

        // empty token between two delimiters
        assert!(matches!(
            parse_shortcut("LCtrl++0x50").unwrap_err(),
            ParseError::UnknownModifier { token, .. } if token.is_empty()
        ));
    }

    #[test]
    fn test_duplicate_modifier() {
        let err = parse_shortcut("LCtrl+lctrl+0x50").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateModifier {
                shortcut: "LCtrl+lctrl+0x50".to_string(),
                token: "lctrl".to_string(),
            }
        );
        assert!(err.to_string().starts_with("Multiple [lctrl] modifiers"));

        let err = parse_shortcut("RAlt + LShift + RALT +0x50").unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateModifier { ref token, .. } if token == "RALT"
        ));
    }

    #[test]
    fn test_left_and_right_are_distinct() {
        let shortcut = parse_shortcut("LCtrl+RCtrl+0x50").unwrap();
        assert_eq!(
            shortcut.modifiers,
            ModifierMask::CTRL_LEFT | ModifierMask::CTRL_RIGHT
        );
    }

    #[test]
    fn test_zero_modifiers() {
        assert_eq!(
            parse_shortcut("0x50").unwrap_err(),
            ParseError::NoModifiers {
                shortcut: "0x50".to_string()
            }
        );
        assert!(matches!(
            parse_shortcut("").unwrap_err(),
            ParseError::NoModifiers { .. }
        ));
    }

    #[test]
    fn test_vk_code_out_of_range() {
        let err = parse_shortcut("LCtrl+LShift+LAlt+0x432A").unwrap_err();
        assert!(matches!(err, ParseError::VkCodeOutOfRange { ref token, .. } if token == "0x432A"));
        assert!(err.to_string().contains("Min: 0x01, Max: 0xFE"));

        assert!(matches!(
            parse_shortcut("LCtrl+0x00").unwrap_err(),
            ParseError::VkCodeOutOfRange { .. }
        ));
        assert!(matches!(
            parse_shortcut("LCtrl+0xFF").unwrap_err(),
            ParseError::VkCodeOutOfRange { .. }
        ));
        assert!(matches!(
            parse_shortcut("LCtrl+0xFFFFFFFFFFFFFFFFFFFF").unwrap_err(),
            ParseError::VkCodeOutOfRange { .. }
        ));
    }

    #[test]
    fn test_vk_code_bounds_are_inclusive() {
        assert_eq!(parse_shortcut("LAlt+0x01").unwrap().vk_code, 0x01);
        assert_eq!(parse_shortcut("LAlt+0xFE").unwrap().vk_code, 0xFE);
        assert_eq!(parse_shortcut("LAlt+0x000041").unwrap().vk_code, 0x41);
    }

    #[test]
    fn test_vk_code_format() {
        for bad in ["LCtrl+50", "LCtrl+0x", "LCtrl+0xZZ", "LCtrl+0x+1", "LCtrl+P", "LCtrl+LShift"] {
            assert!(
                matches!(
                    parse_shortcut(bad).unwrap_err(),
                    ParseError::InvalidVkCodeFormat { .. } | ParseError::UnknownModifier { .. }
                ),
                "{bad}"
            );
        }
        assert!(matches!(
            parse_shortcut("LCtrl+0x").unwrap_err(),
            ParseError::InvalidVkCodeFormat { .. }
        ));
        assert!(matches!(
            parse_shortcut("LCtrl+LShift").unwrap_err(),
            ParseError::InvalidVkCodeFormat { .. }
        ));
        assert!(matches!(
            parse_shortcut("LCtrl+").unwrap_err(),
            ParseError::InvalidVkCodeFormat { .. }
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["lalt+RSHIFT+lctrl+0x9", "RCtrl+RAlt+0xfe", "LShift+RShift+0x41"] {
            let parsed = parse_shortcut(input).unwrap();
            let rendered = parsed.to_string();
            assert_eq!(rendered.parse::<Shortcut>().unwrap(), parsed);
        }
        assert_eq!(
            parse_shortcut("lalt+RSHIFT+lctrl+0x9").unwrap().to_string(),
            "LCtrl+RShift+LAlt+0x09"
        );
    }
}
