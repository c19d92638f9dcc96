//! SessionManager — resolves hierarchical session names to storage.

use std::path::{Path, PathBuf};
use tracing::debug;

use quill_core::error::{PinError, SessionError};
use quill_core::paths::{self, SESSION_HISTORY_FILE, SESSION_PINS_FILE};
use quill_core::PinLimits;
use quill_pins::PinStore;

use crate::history::HistoryStore;

/// Resolves session names under one application root (`<root>/sessions/…`)
/// and hands out session handles. Also owns the location of the optional
/// user-global pin set, which lives beside the sessions tree.
#[derive(Debug, Clone)]
pub struct SessionManager {
    root: PathBuf,
}

impl SessionManager {
    /// A manager over an explicit application root (tests use a tempdir).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A manager over the default `~/.quill`.
    pub fn open_default() -> Self {
        Self::new(paths::default_root())
    }

    /// Resolve `name` to a session handle, creating its directory on first
    /// reference. Validation happens before any I/O; resolution is
    /// idempotent — the same name always yields the same location and
    /// repeated calls create nothing new.
    pub fn resolve(&self, name: &str) -> Result<SessionHandle, SessionError> {
        let dir = paths::session_dir(&self.root.join("sessions"), name)?;

        std::fs::create_dir_all(&dir).map_err(|e| SessionError::Storage {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        debug!(session = name, dir = %dir.display(), "session resolved");

        Ok(SessionHandle {
            name: name.to_string(),
            dir,
        })
    }

    /// The default session (`default`), created on first use like any
    /// other.
    pub fn resolve_default(&self) -> Result<SessionHandle, SessionError> {
        self.resolve(paths::DEFAULT_SESSION)
    }

    /// Location of the user-global pin set, shared across all sessions.
    pub fn user_pins_path(&self) -> PathBuf {
        self.root.join(SESSION_PINS_FILE)
    }

    /// Open the user-global pin set.
    pub fn user_pins(&self, limits: PinLimits) -> Result<PinStore, PinError> {
        PinStore::open(self.user_pins_path(), limits)
    }
}

/// One resolved session. Exposes the stores it owns, each materialized
/// lazily — nothing but the session directory exists until first write.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    name: String,
    dir: PathBuf,
}

impl SessionHandle {
    /// The hierarchical name this handle was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session's storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The owner id for this session's session-specific config scope.
    pub fn config_owner(&self) -> &str {
        &self.name
    }

    /// The session's history log.
    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(self.dir.join(SESSION_HISTORY_FILE))
    }

    /// Open the session's pin set under the given limits.
    pub fn pins(&self, limits: PinLimits) -> Result<PinStore, PinError> {
        PinStore::open(self.dir.join(SESSION_PINS_FILE), limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{PinMethod, Role};
    use tempfile::tempdir;

    #[test]
    fn resolution_is_idempotent() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path());

        let a = manager.resolve("work/api").unwrap();
        let b = manager.resolve("work/api").unwrap();
        assert_eq!(a.dir(), b.dir());
        assert!(a.dir().is_dir());

        // No duplicate or stray directories under the parent.
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("sessions/work"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("api")]);
    }

    #[test]
    fn invalid_names_rejected_before_any_io() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path());

        for name in ["", "../escape", "a//b", "/abs"] {
            let err = manager.resolve(name).unwrap_err();
            assert!(matches!(err, SessionError::InvalidName { .. }));
        }
        // Nothing was created.
        assert!(!dir.path().join("sessions").exists());
    }

    #[test]
    fn default_session_resolves_to_default_path() {
        let dir = tempdir().unwrap();
        let handle = SessionManager::new(dir.path()).resolve_default().unwrap();
        assert_eq!(handle.name(), "default");
        assert!(handle.dir().ends_with("sessions/default"));
    }

    #[test]
    fn parent_and_child_sessions_are_independent() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path());
        let parent = manager.resolve("work").unwrap();
        let child = manager.resolve("work/api").unwrap();

        let mut parent_pins = parent.pins(PinLimits::default()).unwrap();
        parent_pins
            .add(Role::User, PinMethod::Concat, "parent only")
            .unwrap();

        // No pin/config inheritance across the shared path prefix.
        let child_pins = child.pins(PinLimits::default()).unwrap();
        assert!(child_pins.is_empty());

        parent.history().append(&quill_core::HistoryEntry::user("hi")).unwrap();
        assert_eq!(child.history().len().unwrap(), 0);
    }

    #[test]
    fn session_stores_are_lazy() {
        let dir = tempdir().unwrap();
        let handle = SessionManager::new(dir.path()).resolve("lazy").unwrap();
        // Resolving created the directory but no data files.
        assert!(handle.dir().is_dir());
        assert!(!handle.dir().join(SESSION_PINS_FILE).exists());
        assert!(!handle.dir().join(SESSION_HISTORY_FILE).exists());
    }

    #[test]
    fn user_global_pins_live_outside_the_sessions_tree() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path());
        let mut pins = manager.user_pins(PinLimits::default()).unwrap();
        pins.add(Role::System, PinMethod::Concat, "everywhere").unwrap();

        assert!(dir.path().join("pins.jsonl").is_file());
        let session = manager.resolve("any").unwrap();
        assert!(session.pins(PinLimits::default()).unwrap().is_empty());
    }
}
