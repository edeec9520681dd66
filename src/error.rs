//! Custom error types for send-input.
//!
//! Parsing never prints anything: every failure is a value carrying the
//! offending text, and the message is only rendered when the error is
//! displayed at the CLI or log boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a single shortcut key such as
/// `LCtrl+LShift+0x50`.
///
/// Every variant carries the complete shortcut text and the token that
/// caused the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A generic `Shift`, `Ctrl` or `Alt` was used instead of the left/right form.
    #[error(
        "Shortcut key modifier [{token}] is not supported: Please use [L{canonical}] or [R{canonical}] (shortcut key [{shortcut}])"
    )]
    AmbiguousModifier {
        shortcut: String,
        token: String,
        canonical: &'static str,
    },

    /// A modifier token that is not one of the six known names.
    #[error("Unknown shortcut key modifier [{token}] (shortcut key [{shortcut}])")]
    UnknownModifier { shortcut: String, token: String },

    /// The same modifier appears twice.
    #[error("Multiple [{token}] modifiers are not allowed (shortcut key [{shortcut}])")]
    DuplicateModifier { shortcut: String, token: String },

    /// Only a virtual key code was given.
    #[error("Zero key modifiers found (shortcut key [{shortcut}])")]
    NoModifiers { shortcut: String },

    /// The final token is not a `0x`-prefixed hexadecimal number.
    #[error(
        "Invalid virtual key code [{token}]: Expected a hexadecimal number with a 0x prefix, e.g. 0x50 (shortcut key [{shortcut}])"
    )]
    InvalidVkCodeFormat { shortcut: String, token: String },

    /// The virtual key code is outside `[0x01, 0xFE]`.
    #[error("Invalid virtual key code [{token}]: Min: 0x01, Max: 0xFE (shortcut key [{shortcut}])")]
    VkCodeOutOfRange { shortcut: String, token: String },
}

impl ParseError {
    /// The complete shortcut text that failed to parse.
    pub fn shortcut(&self) -> &str {
        match self {
            Self::AmbiguousModifier { shortcut, .. }
            | Self::UnknownModifier { shortcut, .. }
            | Self::DuplicateModifier { shortcut, .. }
            | Self::NoModifiers { shortcut }
            | Self::InvalidVkCodeFormat { shortcut, .. }
            | Self::VkCodeOutOfRange { shortcut, .. } => shortcut,
        }
    }
}

/// Structural errors in a binding file.
///
/// Line numbers are 1-based; `line` is the original, untrimmed text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Line #{line_number}: Missing delimiter [|]: [{line}]")]
    MissingDelimiter { line_number: usize, line: String },

    #[error("Line #{line_number}: Shortcut key is empty: [{line}]")]
    EmptyShortcut { line_number: usize, line: String },

    #[error("Line #{line_number}: Text to send is empty: [{line}]")]
    EmptyPayload { line_number: usize, line: String },

    #[error("Line #{line_number}: {source}: [{line}]")]
    Shortcut {
        line_number: usize,
        line: String,
        #[source]
        source: ParseError,
    },

    #[error(
        "Config file entries #{first} and #{second} have the same shortcut key [{shortcut}] (lines #{first_line} and #{second_line})"
    )]
    DuplicateBinding {
        first: usize,
        second: usize,
        first_line: usize,
        second_line: usize,
        shortcut: String,
    },

    #[error("Config file contains no shortcut key entries")]
    NoBindings,
}

/// Main error type for send-input operations.
#[derive(Error, Debug)]
pub enum SendInputError {
    /// The binding file is invalid.
    #[error("failed to load config from '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// The binding file path does not name a readable file.
    #[error("invalid config path '{path}': {reason}")]
    ConfigPath { path: PathBuf, reason: String },

    /// The OS accepted fewer synthetic events than were submitted.
    #[error("text injection failed: {accepted} of {submitted} synthetic key events were accepted")]
    IncompleteInjection { submitted: usize, accepted: usize },

    /// The OS input layer rejected the batch outright.
    #[error("text injection failed: {0}")]
    Injection(String),

    /// Error installing or running the keyboard hook.
    #[error("keyboard hook error: {0}")]
    Hook(String),

    /// Platform-specific operation is not supported.
    #[error("operation not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for send-input operations.
pub type Result<T> = std::result::Result<T, SendInputError>;

impl SendInputError {
    /// Create a new Config error.
    pub fn config(path: impl Into<PathBuf>, source: ConfigError) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }

    /// Create a new ConfigPath error.
    pub fn config_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Injection error.
    pub fn injection(message: impl Into<String>) -> Self {
        Self::Injection(message.into())
    }

    /// Create a new Hook error.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }

    /// Create a new UnsupportedPlatform error.
    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(message.into())
    }
}
