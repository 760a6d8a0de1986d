//! Unified error types for the console panel.

use std::fmt;

// ---------------------------------------------------------------------------
// ConsoleError
// ---------------------------------------------------------------------------

/// Errors raised by the session controller.
#[derive(Debug)]
pub enum ConsoleError {
    /// An operation that needs a surface ran before `Console::mount`.
    NotMounted,
    /// `mount` was called while a line is still being edited.
    InputPending,
    /// The session reached `Ended`; no further input can be requested.
    Ended,
    /// The host surface failed to attach, draw, or detach.
    Surface(std::io::Error),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(
                f,
                "console is not mounted: call Console::mount with a surface before output or input"
            ),
            Self::InputPending => write!(f, "cannot remount while an input line is being edited"),
            Self::Ended => write!(f, "console session has ended"),
            Self::Surface(e) => write!(f, "surface: {e}"),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        Self::Surface(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}
