//! Session namespace for Quill.
//!
//! Sessions are `/`-delimited hierarchical names (`work/project1/api`)
//! mapping 1:1 onto nested directories under the sessions root. A session
//! owns one session-specific config document, one pin set, and one history
//! log, all created lazily and never implicitly deleted.
//!
//! Hierarchical names imply **no inheritance**: `work` and `work/api`
//! share a path prefix and nothing else — no config, no pins, no history
//! flows between parent and child.

pub mod history;
pub mod manager;

pub use history::HistoryStore;
pub use manager::{SessionHandle, SessionManager};
