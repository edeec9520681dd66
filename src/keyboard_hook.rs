//! System-wide keyboard hook.
//!
//! On Windows this installs a `WH_KEYBOARD_LL` hook on the calling thread
//! and pumps messages until stopped. Low-level hook callbacks carry no user
//! data, so the [`Engine`](crate::engine::Engine) is parked in a
//! thread-local for the lifetime of the hook; every callback runs on that
//! same thread.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::config::BindingTable;
use crate::error::Result;

/// Stops a running [`KeyboardHook`] from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    thread_id: Arc<AtomicU32>,
}

impl StopHandle {
    /// Ask the hook thread to leave its message loop.
    ///
    /// Does nothing if the hook is not running yet or has already exited.
    pub fn stop(&self) {
        let thread_id = self.thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            platform::post_quit(thread_id);
        }
    }
}

pub struct KeyboardHook {
    bindings: BindingTable,
    thread_id: Arc<AtomicU32>,
}

impl KeyboardHook {
    pub fn new(bindings: BindingTable) -> Self {
        Self {
            bindings,
            thread_id: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            thread_id: Arc::clone(&self.thread_id),
        }
    }

    /// Install the hook and block until stopped or a fatal injection error.
    pub fn run(self) -> Result<()> {
        platform::run(self.bindings, &self.thread_id)
    }
}

#[cfg(windows)]
mod platform {
    use std::cell::RefCell;
    use std::ptr;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tracing::{error, info, warn};
    use winapi::shared::minwindef::{LPARAM, LRESULT, WPARAM};
    use winapi::um::libloaderapi::GetModuleHandleW;
    use winapi::um::processthreadsapi::GetCurrentThreadId;
    use winapi::um::winuser::{
        CallNextHookEx, DispatchMessageW, GetMessageW, PostQuitMessage, PostThreadMessageW,
        SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT,
        LLKHF_INJECTED, LLKHF_UP, MSG, WH_KEYBOARD_LL, WM_QUIT,
    };

    use crate::config::BindingTable;
    use crate::engine::Engine;
    use crate::error::{Result, SendInputError};
    use crate::key_sender::SendInputSink;
    use crate::tracker::KeyEvent;

    struct HookContext {
        engine: Engine<SendInputSink>,
        failure: Option<SendInputError>,
    }

    thread_local! {
        static CONTEXT: RefCell<Option<HookContext>> = const { RefCell::new(None) };
    }

    pub(super) fn post_quit(thread_id: u32) {
        // SAFETY: posting to a thread id has no memory-safety preconditions.
        let posted = unsafe { PostThreadMessageW(thread_id, WM_QUIT, 0, 0) };
        if posted == 0 {
            warn!(thread_id, "failed to post quit message to hook thread");
        }
    }

    pub(super) fn run(bindings: BindingTable, thread_id: &AtomicU32) -> Result<()> {
        CONTEXT.with(|context| {
            *context.borrow_mut() = Some(HookContext {
                engine: Engine::new(bindings, SendInputSink::new()),
                failure: None,
            });
        });

        // SAFETY: plain Win32 calls; the hook procedure has the required
        // signature and the handle is released before returning.
        let hook = unsafe {
            SetWindowsHookExW(
                WH_KEYBOARD_LL,
                Some(hook_proc),
                GetModuleHandleW(ptr::null()),
                0,
            )
        };
        if hook.is_null() {
            CONTEXT.with(|context| context.borrow_mut().take());
            return Err(SendInputError::hook(format!(
                "SetWindowsHookExW failed: {}",
                std::io::Error::last_os_error()
            )));
        }

        // SAFETY: GetCurrentThreadId takes no arguments and cannot fail.
        thread_id.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
        info!("keyboard hook installed, listening for shortcut keys");

        let pump_result = pump_messages();

        thread_id.store(0, Ordering::SeqCst);
        // SAFETY: `hook` came from SetWindowsHookExW above.
        unsafe { UnhookWindowsHookEx(hook) };
        info!("keyboard hook removed");

        let failure = CONTEXT
            .with(|context| context.borrow_mut().take())
            .and_then(|context| context.failure);

        match failure {
            Some(err) => Err(err),
            None => pump_result,
        }
    }

    fn pump_messages() -> Result<()> {
        // SAFETY: MSG is plain data and only touched by the message APIs.
        unsafe {
            let mut msg: MSG = std::mem::zeroed();
            loop {
                match GetMessageW(&mut msg, ptr::null_mut(), 0, 0) {
                    0 => return Ok(()),
                    -1 => {
                        return Err(SendInputError::hook(format!(
                            "GetMessageW failed: {}",
                            std::io::Error::last_os_error()
                        )))
                    }
                    _ => {
                        TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }
        }
    }

    unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        if code == HC_ACTION {
            // SAFETY: for HC_ACTION, lparam points to a KBDLLHOOKSTRUCT.
            let info = &*(lparam as *const KBDLLHOOKSTRUCT);
            let event = KeyEvent {
                vk_code: info.vkCode,
                is_key_up: info.flags & LLKHF_UP != 0,
                is_injected: info.flags & LLKHF_INJECTED != 0,
            };
            handle(event);
        }
        CallNextHookEx(ptr::null_mut(), code, wparam, lparam)
    }

    fn handle(event: KeyEvent) {
        CONTEXT.with(|context| {
            let Ok(mut guard) = context.try_borrow_mut() else {
                return;
            };
            let Some(context) = guard.as_mut() else {
                return;
            };
            if context.failure.is_some() {
                return;
            }

            if let Err(err) = context.engine.on_key_event(event) {
                error!(error = %err, "text injection failed, stopping");
                context.failure = Some(err);
                // SAFETY: called on the thread that owns the message loop.
                unsafe { PostQuitMessage(1) };
            }
        });
    }
}

#[cfg(not(windows))]
mod platform {
    use std::sync::atomic::AtomicU32;

    use crate::config::BindingTable;
    use crate::error::{Result, SendInputError};

    pub(super) fn post_quit(_thread_id: u32) {}

    pub(super) fn run(_bindings: BindingTable, _thread_id: &AtomicU32) -> Result<()> {
        Err(SendInputError::unsupported_platform(
            "global keyboard hooks are only implemented for Windows",
        ))
    }
}
