//! # Send Input
//!
//! Binds text such as a username or password to global keyboard shortcuts
//! and types it into whichever window has focus when the shortcut is
//! pressed.
//!
//! ## Features
//!
//! - Left and right Ctrl, Shift and Alt are distinct modifiers
//! - Shortcuts fire only on an exact modifier match
//! - Text is typed as Unicode keystrokes, independent of keyboard layout
//! - The binding file is validated completely before anything is hooked
//! - Text typed by this process never retriggers a shortcut
//!
//! ## Example
//!
//! ```
//! use send_input::{BindingTable, Engine, InputSink, KeyEvent, SyntheticKeyEvent};
//!
//! struct Discard;
//!
//! impl InputSink for Discard {
//!     fn submit(&mut self, events: &[SyntheticKeyEvent]) -> send_input::Result<usize> {
//!         Ok(events.len())
//!     }
//! }
//!
//! let bindings = BindingTable::parse_str("LCtrl+LAlt+0x50|my-secret-password").unwrap();
//! let mut engine = Engine::new(bindings, Discard);
//!
//! engine.on_key_event(KeyEvent::down(0xA2)).unwrap(); // LCtrl
//! engine.on_key_event(KeyEvent::down(0xA4)).unwrap(); // LAlt
//! engine.on_key_event(KeyEvent::down(0x50)).unwrap();
//! engine.on_key_event(KeyEvent::up(0x50)).unwrap();
//! ```
//!
//! ## Configuration
//!
//! One binding per line, `<shortcut>|<text>`:
//!
//! ```text
//! # Lines starting with '#' are comments
//! LCtrl+LShift+LAlt+0x50|my-secret-password
//! RCtrl+RAlt+0x55|alice@example.com
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod key_sender;
pub mod keyboard_hook;
pub mod modifiers;
pub mod shortcut;
pub mod tracker;

pub use config::{BindingSummary, BindingTable, ShortcutBinding};
pub use engine::{Dispatch, Engine};
pub use error::{ConfigError, ParseError, Result, SendInputError};
pub use key_sender::{synthesize, InputSink, KeySender, SyntheticKeyEvent};
pub use keyboard_hook::{KeyboardHook, StopHandle};
pub use modifiers::{ModifierKey, ModifierMask};
pub use shortcut::{parse_shortcut, Shortcut};
pub use tracker::{KeyEvent, ModifierTracker};

#[cfg(windows)]
pub use key_sender::SendInputSink;
