//! Text injection.
//!
//! A payload is expanded into one key-down and one key-up per character,
//! interleaved, and submitted to the OS as a single batch. A batch the OS
//! only partly accepts is an error: half a password typed into a login
//! field must never go unnoticed.

use tracing::{debug, error};

use crate::error::{Result, SendInputError};

/// One synthetic key transition carrying a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticKeyEvent {
    pub character: char,
    pub is_key_up: bool,
}

/// Expand `payload` into `2 * chars` events: down, up, down, up, ...
pub fn synthesize(payload: &str) -> Vec<SyntheticKeyEvent> {
    payload
        .chars()
        .flat_map(|character| {
            [
                SyntheticKeyEvent {
                    character,
                    is_key_up: false,
                },
                SyntheticKeyEvent {
                    character,
                    is_key_up: true,
                },
            ]
        })
        .collect()
}

/// The OS input submission layer.
pub trait InputSink {
    /// Submit `events` in order as one batch and return how many were
    /// accepted.
    fn submit(&mut self, events: &[SyntheticKeyEvent]) -> Result<usize>;
}

/// Types payloads through an [`InputSink`].
#[derive(Debug, Clone, Default)]
pub struct KeySender<S> {
    sink: S,
}

impl<S: InputSink> KeySender<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Type `payload` into whatever currently has keyboard focus.
    pub fn inject(&mut self, payload: &str) -> Result<()> {
        let events = synthesize(payload);
        if events.is_empty() {
            return Ok(());
        }

        let accepted = self.sink.submit(&events)?;
        if accepted != events.len() {
            error!(
                submitted = events.len(),
                accepted, "synthetic key events were dropped"
            );
            return Err(SendInputError::IncompleteInjection {
                submitted: events.len(),
                accepted,
            });
        }

        debug!(events = events.len(), "synthetic key events submitted");
        Ok(())
    }
}

#[cfg(windows)]
pub use self::windows::SendInputSink;

#[cfg(windows)]
mod windows {
    use std::mem;

    use winapi::um::winuser::{
        SendInput, INPUT, INPUT_KEYBOARD, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE,
    };

    use super::{InputSink, SyntheticKeyEvent};
    use crate::error::{Result, SendInputError};

    /// Submits events through Win32 `SendInput` as `KEYEVENTF_UNICODE`
    /// keystrokes, which are independent of the active keyboard layout.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SendInputSink;

    impl SendInputSink {
        pub fn new() -> Self {
            Self
        }
    }

    fn unicode_input(unit: u16, is_key_up: bool) -> INPUT {
        let mut flags = KEYEVENTF_UNICODE;
        if is_key_up {
            flags |= KEYEVENTF_KEYUP;
        }

        // SAFETY: INPUT is plain data; zeroed is a valid value and the
        // keyboard arm of the union is written before use.
        unsafe {
            let mut input: INPUT = mem::zeroed();
            input.type_ = INPUT_KEYBOARD;
            let ki = input.u.ki_mut();
            ki.wVk = 0;
            ki.wScan = unit;
            ki.dwFlags = flags;
            ki.time = 0;
            ki.dwExtraInfo = 0;
            input
        }
    }

    impl InputSink for SendInputSink {
        fn submit(&mut self, events: &[SyntheticKeyEvent]) -> Result<usize> {
            // Characters outside the BMP take two UTF-16 units, so keep the
            // INPUT index at which each event ends.
            let mut inputs = Vec::with_capacity(events.len());
            let mut event_ends = Vec::with_capacity(events.len());
            for event in events {
                let mut units = [0u16; 2];
                for &unit in event.character.encode_utf16(&mut units).iter() {
                    inputs.push(unicode_input(unit, event.is_key_up));
                }
                event_ends.push(inputs.len());
            }

            let count = u32::try_from(inputs.len())
                .map_err(|_| SendInputError::injection("payload is too long"))?;

            // SAFETY: `inputs` is a live, correctly sized INPUT array.
            let sent = unsafe {
                SendInput(
                    count,
                    inputs.as_mut_ptr(),
                    mem::size_of::<INPUT>() as i32,
                )
            } as usize;

            if sent == 0 {
                return Err(SendInputError::injection(format!(
                    "SendInput was blocked: {}",
                    std::io::Error::last_os_error()
                )));
            }

            Ok(event_ends.iter().take_while(|&&end| end <= sent).count())
        }
    }
}
