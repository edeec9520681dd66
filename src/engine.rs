//! The shortcut engine: modifier tracking, matching and injection.
//!
//! An [`Engine`] owns everything the keyboard hook needs, so several
//! independent engines can exist side by side (one per test, for example).
//! It is driven by one thread and never blocks.

use tracing::{debug, info};

use crate::config::BindingTable;
use crate::error::Result;
use crate::key_sender::{InputSink, KeySender};
use crate::modifiers::ModifierKey;
use crate::tracker::{KeyEvent, ModifierTracker, Tracked};

/// What the engine did with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Injected event, or a non-modifier key-down.
    Ignored,
    /// A modifier key went down or up.
    ModifierChanged(ModifierKey),
    /// A non-modifier key-up that matches no binding.
    NoMatch,
    /// The binding at this 1-based entry index was typed.
    Injected { entry: usize },
}

pub struct Engine<S> {
    bindings: BindingTable,
    tracker: ModifierTracker,
    sender: KeySender<S>,
}

impl<S: InputSink> Engine<S> {
    pub fn new(bindings: BindingTable, sink: S) -> Self {
        Self {
            bindings,
            tracker: ModifierTracker::new(),
            sender: KeySender::new(sink),
        }
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn tracker(&self) -> &ModifierTracker {
        &self.tracker
    }

    pub fn sink(&self) -> &S {
        self.sender.sink()
    }

    /// Process one raw key event, in arrival order.
    ///
    /// Shortcuts fire on the key-up of the non-modifier key, and only when
    /// the held modifiers equal the binding's modifiers exactly.
    pub fn on_key_event(&mut self, event: KeyEvent) -> Result<Dispatch> {
        match self.tracker.on_key_event(&event) {
            Tracked::Ignored => return Ok(Dispatch::Ignored),
            Tracked::Modifier(key) => return Ok(Dispatch::ModifierChanged(key)),
            Tracked::Other => {}
        }

        if !event.is_key_up {
            return Ok(Dispatch::Ignored);
        }

        let modifiers = self.tracker.state();
        let Some((entry, binding)) = self.bindings.find_entry(modifiers, event.vk_code) else {
            if !modifiers.is_empty() {
                debug!(vk_code = event.vk_code, ?modifiers, "no binding matched");
            }
            return Ok(Dispatch::NoMatch);
        };

        info!(
            shortcut = %binding.shortcut(),
            line = binding.line_number(),
            chars = binding.payload().chars().count(),
            "shortcut matched, typing text"
        );
        self.sender.inject(binding.payload())?;
        Ok(Dispatch::Injected { entry })
    }
}
