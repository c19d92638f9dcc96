//! # Quill Core
//!
//! Domain types and error definitions for Quill's configuration and
//! persistent-context subsystem. This crate has **zero framework
//! dependencies** — it defines the value objects (scopes, config documents,
//! pins, history entries) and the error taxonomy that every other crate
//! implements against.
//!
//! ## Design Philosophy
//!
//! All crates depend inward on core. Persistence and policy live in the
//! outer crates (`quill-config`, `quill-session`, `quill-pins`); this crate
//! only knows what the data *is*, plus two small invariant-bearing helpers:
//! the atomic-write primitive every mutating store uses, and the pure
//! session-name → storage-path mapping.

pub mod document;
pub mod error;
pub mod history;
pub mod paths;
pub mod pin;
pub mod scope;
pub mod storage;
pub mod value;

// Re-export key types at crate root for ergonomics
pub use document::ConfigDocument;
pub use error::{ConfigError, Error, HistoryError, PinError, RenderError, Result, SessionError};
pub use history::HistoryEntry;
pub use pin::{Pin, PinLimits, PinMethod, Role};
pub use scope::ConfigScope;
pub use value::ConfigValue;
