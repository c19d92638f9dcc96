//! Crash-safe file replacement shared by every mutating store.
//!
//! Write-to-temp then rename: a crash mid-write leaves either the old file
//! or the new file, never a half-written document. This is also the
//! cross-process policy — two racing invocations each produce a consistent
//! file and the last rename wins; an applied mutation can be overwritten,
//! but nothing is ever torn.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `bytes`, creating parent directories as
/// needed. The temp file lives next to the target so the rename stays on
/// one filesystem.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let result = write_and_rename(&tmp, path, bytes);
    if result.is_err() {
        // Best effort: never leave a temp file behind on failure.
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".tmp.{}", std::process::id()));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_parents_and_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeply/doc.toml");
        atomic_write(&path, b"key = \"value\"\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "key = \"value\"\n");
    }

    #[test]
    fn replaces_existing_content_completely() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.toml");
        atomic_write(&path, b"first = 1\n").unwrap();
        atomic_write(&path, b"second = 2\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second = 2\n");
    }

    #[test]
    fn leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.toml");
        atomic_write(&path, b"x = 1\n").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.toml")]);
    }

    #[test]
    fn last_writer_wins_is_whole_file() {
        // Two "invocations" writing the same path: the survivor is one
        // writer's complete document, never an interleaving.
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.toml");
        atomic_write(&path, b"writer = \"a\"\n").unwrap();
        atomic_write(&path, b"writer = \"b\"\n").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "writer = \"b\"\n");
    }
}
