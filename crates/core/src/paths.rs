//! Session name validation and the name → storage-path mapping.
//!
//! A session's storage path is a pure function of its hierarchical name:
//! segments of `work/project1/api` become nested directories under the
//! sessions root. Distinct names never alias the same location and the same
//! name always resolves to the same location, so validation lives here in
//! core where both the session manager and the config store can share it.

use std::path::{Path, PathBuf};

use crate::error::SessionError;

/// Per-session data file names. Session name segments may not collide with
/// these, so a child session directory can never shadow a sibling data file.
pub const SESSION_CONFIG_FILE: &str = "config.toml";
pub const SESSION_PINS_FILE: &str = "pins.jsonl";
pub const SESSION_HISTORY_FILE: &str = "history.jsonl";

/// The session used when none is selected.
pub const DEFAULT_SESSION: &str = "default";

const RESERVED_SEGMENTS: [&str; 3] = [
    SESSION_CONFIG_FILE,
    SESSION_PINS_FILE,
    SESSION_HISTORY_FILE,
];

/// Split and validate a hierarchical session name.
///
/// Rules, checked before any I/O:
/// - at least one segment, every segment non-empty (rejects `""`, leading
///   or trailing `/`, and `//`);
/// - no `.` or `..` segments;
/// - segments use only ASCII alphanumerics, `-`, `_`, and `.`;
/// - no segment equal to a reserved data file name.
pub fn session_segments(name: &str) -> Result<Vec<&str>, SessionError> {
    let invalid = |reason: &str| SessionError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("empty name"));
    }

    let segments: Vec<&str> = name.split('/').collect();
    for segment in &segments {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }
        if *segment == "." || *segment == ".." {
            return Err(invalid("path traversal segment"));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("segment contains disallowed characters"));
        }
        if RESERVED_SEGMENTS.contains(segment) {
            return Err(invalid("segment collides with a reserved file name"));
        }
    }

    Ok(segments)
}

/// Map a validated session name onto its directory under `sessions_root`.
pub fn session_dir(sessions_root: &Path, name: &str) -> Result<PathBuf, SessionError> {
    let mut dir = sessions_root.to_path_buf();
    for segment in session_segments(name)? {
        dir.push(segment);
    }
    Ok(dir)
}

/// The default application root: `~/.quill` (falls back to the current
/// directory when no home is set).
pub fn default_root() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".quill")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchical_names_split_into_segments() {
        assert_eq!(
            session_segments("work/project1/api").unwrap(),
            vec!["work", "project1", "api"]
        );
        assert_eq!(session_segments("default").unwrap(), vec!["default"]);
    }

    #[test]
    fn invalid_names_rejected() {
        for name in [
            "",
            "/abs",
            "a//b",
            "trailing/",
            "..",
            "a/../b",
            "a/./b",
            "spa ce",
            "uni\u{2603}",
            "back\\slash",
            "work/pins.jsonl",
            "config.toml",
        ] {
            let err = session_segments(name).unwrap_err();
            assert!(
                matches!(err, SessionError::InvalidName { .. }),
                "expected rejection for {name:?}"
            );
        }
    }

    #[test]
    fn dotted_segments_allowed_when_not_reserved() {
        assert!(session_segments("v1.2/notes").is_ok());
    }

    #[test]
    fn distinct_names_never_alias() {
        let root = Path::new("/data/sessions");
        let a = session_dir(root, "work/api").unwrap();
        let b = session_dir(root, "work/api2").unwrap();
        let c = session_dir(root, "workapi").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn same_name_always_resolves_identically() {
        let root = Path::new("/data/sessions");
        assert_eq!(
            session_dir(root, "work/api").unwrap(),
            session_dir(root, "work/api").unwrap()
        );
    }
}
