//! Modifier key state tracking.

use tracing::debug;

use crate::modifiers::{ModifierKey, ModifierMask};

/// A raw key transition as delivered by the OS keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub vk_code: u32,
    pub is_key_up: bool,
    /// Generated by software rather than a physical key.
    pub is_injected: bool,
}

impl KeyEvent {
    pub fn down(vk_code: u32) -> Self {
        Self {
            vk_code,
            is_key_up: false,
            is_injected: false,
        }
    }

    pub fn up(vk_code: u32) -> Self {
        Self {
            vk_code,
            is_key_up: true,
            is_injected: false,
        }
    }

    pub fn injected(self) -> Self {
        Self {
            is_injected: true,
            ..self
        }
    }
}

/// How the tracker treated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracked {
    /// Injected event; state untouched.
    Ignored,
    /// A modifier key went down or up.
    Modifier(ModifierKey),
    /// Any other key; left for the matcher.
    Other,
}

/// Keeps the set of physically held modifier keys.
#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    state: ModifierMask,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModifierMask {
        self.state
    }

    /// Update the held modifiers from one key event.
    ///
    /// Injected events never change the state, so text typed by this
    /// process cannot press or release a tracked modifier.
    pub fn on_key_event(&mut self, event: &KeyEvent) -> Tracked {
        if event.is_injected {
            return Tracked::Ignored;
        }

        let Some(key) = ModifierKey::from_vk_code(event.vk_code) else {
            return Tracked::Other;
        };

        let previous = self.state;
        if event.is_key_up {
            self.state.remove(key.mask());
        } else {
            self.state.insert(key.mask());
        }

        if previous != self.state {
            debug!(modifier = %key, state = ?self.state, "modifier state changed");
        }
        Tracked::Modifier(key)
    }
}
