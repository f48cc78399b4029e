// src/error.rs

//! Unified error handling for the watcher.
//!
//! Errors fall into four operational classes:
//! - fetch: the source page could not be retrieved
//! - structure: the page came back but the expected markup is gone
//! - persistence: the snapshot store could not be read or written
//! - notify: the outbound mail could not be delivered
//!
//! Fetch and structure errors skip the current cycle only. Notify errors
//! are logged and swallowed by the pipeline. Configuration errors are the
//! only ones that stop the process, and only at startup.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source page could not be retrieved (network error or non-2xx)
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Designated markup was not found in the page
    #[error("Structure error: {0}")]
    Structure(String),

    /// Snapshot store failure other than plain absence
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mail could not be built or delivered
    #[error("Notify error: {0}")]
    Notify(String),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a structure error.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error only skips the current cycle (source unreachable
    /// or source markup changed).
    pub fn is_cycle_skip(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Structure(_))
    }

    /// Whether this error came from the snapshot store.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Io(_) | Self::Json(_))
    }
}
