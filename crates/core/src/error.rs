//! Error types for the Quill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! "Not found" is deliberately **not** an error anywhere in this taxonomy:
//! a missing config document or pin file is a normal absence signal and is
//! modeled as `Option`, so callers cannot confuse it with a failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::pin::{PinMethod, Role};
use crate::scope::ConfigScope;

/// The top-level error type for all Quill operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Pin errors ---
    #[error("Pin error: {0}")]
    Pin(#[from] PinError),

    // --- Render errors ---
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    // --- History errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Document exists but could not be parsed. The resolver downgrades
    /// this to a warning and treats the scope as empty; merge-writes do not
    /// (a merge base must be trustworthy).
    #[error("Corrupt config document at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Scope {scope} is read-only")]
    ReadOnlyScope { scope: ConfigScope },

    #[error("Scope {scope} has no file backing")]
    UnbackedScope { scope: ConfigScope },

    #[error("Scope {scope} requires an owner id")]
    MissingOwner { scope: ConfigScope },

    #[error("Unknown config scope: {0}")]
    UnknownScope(String),

    #[error("Config storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// A config value exists but has the wrong type for the requested
    /// coercion. Never silently stringified.
    #[error("Config key {key}: expected {expected}, found {found}")]
    Coercion {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected before any I/O happens.
    #[error("Invalid session name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Session storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum PinError {
    /// The role is at capacity. The store rejects rather than evicts, so
    /// this never implies lost data.
    #[error("Pin limit reached for role {role}: {limit} pins")]
    LimitExceeded { role: Role, limit: usize },

    #[error("No pin at index {index} for role {role}")]
    NotFound { role: Role, index: usize },

    #[error("Method {method} is not allowed for role {role}")]
    MethodNotAllowed { role: Role, method: PinMethod },

    /// Pins are user data; a pin file that fails to parse is surfaced
    /// instead of being partially loaded and rewritten without the
    /// unreadable entries.
    #[error("Corrupt pin file at {path} (line {line}): {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Pin storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Template references unbound variable ${0}")]
    UnknownVariable(String),

    #[error("Render mode {method} is not valid for role {role}")]
    InvalidMode { role: Role, method: PinMethod },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_limit_error_displays_role_and_limit() {
        let err = Error::Pin(PinError::LimitExceeded {
            role: Role::User,
            limit: 50,
        });
        assert!(err.to_string().contains("user"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn invalid_session_name_displays_reason() {
        let err = Error::Session(SessionError::InvalidName {
            name: "../etc".into(),
            reason: "path traversal segment".into(),
        });
        assert!(err.to_string().contains("../etc"));
        assert!(err.to_string().contains("traversal"));
    }

    #[test]
    fn coercion_error_names_key_and_types() {
        let err = ConfigError::Coercion {
            key: "pin_limits.user".into(),
            expected: "integer",
            found: "string",
        };
        assert!(err.to_string().contains("pin_limits.user"));
        assert!(err.to_string().contains("integer"));
    }
}
