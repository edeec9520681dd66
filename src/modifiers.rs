//! Modifier key vocabulary.
//!
//! Ctrl, Shift and Alt are tracked separately for the left and right
//! physical key, giving six distinguishable modifiers.

use bitflags::bitflags;
use std::fmt;

/// Win32 virtual key code of the left Shift key.
pub const VK_LSHIFT: u8 = 0xA0;
/// Win32 virtual key code of the right Shift key.
pub const VK_RSHIFT: u8 = 0xA1;
/// Win32 virtual key code of the left Ctrl key.
pub const VK_LCONTROL: u8 = 0xA2;
/// Win32 virtual key code of the right Ctrl key.
pub const VK_RCONTROL: u8 = 0xA3;
/// Win32 virtual key code of the left Alt key.
pub const VK_LMENU: u8 = 0xA4;
/// Win32 virtual key code of the right Alt key.
pub const VK_RMENU: u8 = 0xA5;

bitflags! {
    /// A set of held modifier keys.
    ///
    /// Two masks match only when they are exactly equal; holding an extra
    /// modifier is a different mask.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierMask: u8 {
        const CTRL_LEFT   = 0b0000_0001;
        const CTRL_RIGHT  = 0b0000_0010;
        const SHIFT_LEFT  = 0b0000_0100;
        const SHIFT_RIGHT = 0b0000_1000;
        const ALT_LEFT    = 0b0001_0000;
        const ALT_RIGHT   = 0b0010_0000;
    }
}

/// One of the six physical modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    CtrlLeft,
    CtrlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
}

impl ModifierKey {
    /// All modifiers in canonical order.
    pub const ALL: [ModifierKey; 6] = [
        ModifierKey::CtrlLeft,
        ModifierKey::CtrlRight,
        ModifierKey::ShiftLeft,
        ModifierKey::ShiftRight,
        ModifierKey::AltLeft,
        ModifierKey::AltRight,
    ];

    /// The name used in binding files, e.g. `LCtrl`.
    pub fn name(self) -> &'static str {
        match self {
            ModifierKey::CtrlLeft => "LCtrl",
            ModifierKey::CtrlRight => "RCtrl",
            ModifierKey::ShiftLeft => "LShift",
            ModifierKey::ShiftRight => "RShift",
            ModifierKey::AltLeft => "LAlt",
            ModifierKey::AltRight => "RAlt",
        }
    }

    pub fn mask(self) -> ModifierMask {
        match self {
            ModifierKey::CtrlLeft => ModifierMask::CTRL_LEFT,
            ModifierKey::CtrlRight => ModifierMask::CTRL_RIGHT,
            ModifierKey::ShiftLeft => ModifierMask::SHIFT_LEFT,
            ModifierKey::ShiftRight => ModifierMask::SHIFT_RIGHT,
            ModifierKey::AltLeft => ModifierMask::ALT_LEFT,
            ModifierKey::AltRight => ModifierMask::ALT_RIGHT,
        }
    }

    pub fn vk_code(self) -> u8 {
        match self {
            ModifierKey::CtrlLeft => VK_LCONTROL,
            ModifierKey::CtrlRight => VK_RCONTROL,
            ModifierKey::ShiftLeft => VK_LSHIFT,
            ModifierKey::ShiftRight => VK_RSHIFT,
            ModifierKey::AltLeft => VK_LMENU,
            ModifierKey::AltRight => VK_RMENU,
        }
    }

    /// Map a virtual key code to the modifier it names, if any.
    ///
    /// The generic `VK_SHIFT`/`VK_CONTROL`/`VK_MENU` codes are not
    /// modifiers here: low-level hooks always report the sided codes.
    pub fn from_vk_code(vk_code: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| u32::from(key.vk_code()) == vk_code)
    }

    /// Case-insensitive lookup of a binding-file modifier name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ModifierKey> for ModifierMask {
    fn from(key: ModifierKey) -> Self {
        key.mask()
    }
}

impl ModifierMask {
    /// The held modifiers, in canonical order.
    pub fn keys(self) -> impl Iterator<Item = ModifierKey> {
        ModifierKey::ALL
            .into_iter()
            .filter(move |key| self.contains(key.mask()))
    }

    /// Names of the held modifiers, in canonical order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        self.keys().map(ModifierKey::name)
    }
}
