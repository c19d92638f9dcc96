//! ConfigStore — reads and writes scoped config documents on disk.
//!
//! Pure persistence, no merge policy: one TOML file per scope (or per
//! owner within a scope), located under a single application root. Reads
//! return `Ok(None)` for a missing document — absence is a normal signal,
//! not an error. Writes are merge-writes protected by atomic
//! temp-then-rename, so a crash never leaves a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use quill_core::error::ConfigError;
use quill_core::paths::{self, SESSION_CONFIG_FILE};
use quill_core::storage::atomic_write;
use quill_core::{ConfigDocument, ConfigScope, ConfigValue};

/// File-backed store for the four persisted scopes. Environment and CLI
/// values never touch disk and are rejected here.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// A store rooted at an explicit directory (tests use a tempdir).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A store rooted at the default `~/.quill`.
    pub fn open_default() -> Self {
        Self::new(paths::default_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the document for a scope. `Ok(None)` means no document exists
    /// yet; callers treat that as empty. An unparseable document is
    /// [`ConfigError::Corrupt`].
    pub fn read(
        &self,
        scope: ConfigScope,
        owner: Option<&str>,
    ) -> Result<Option<ConfigDocument>, ConfigError> {
        let path = self.path_for(scope, owner)?;

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Storage {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        let values: BTreeMap<String, ConfigValue> =
            toml::from_str(&content).map_err(|e| ConfigError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!(scope = %scope, path = %path.display(), keys = values.len(), "config document loaded");
        Ok(Some(ConfigDocument {
            scope,
            owner: owner.map(str::to_string),
            values,
        }))
    }

    /// Merge-write: keys present in `partial` update the persisted
    /// document, absent keys are untouched. The system-default scope is
    /// read-only. A corrupt existing document fails the write rather than
    /// being silently replaced — a merge base must be trustworthy.
    pub fn write(
        &self,
        scope: ConfigScope,
        owner: Option<&str>,
        partial: &BTreeMap<String, ConfigValue>,
    ) -> Result<(), ConfigError> {
        if scope == ConfigScope::SystemDefault {
            return Err(ConfigError::ReadOnlyScope { scope });
        }
        let path = self.path_for(scope, owner)?;

        let mut values = match self.read(scope, owner)? {
            Some(doc) => doc.values,
            None => BTreeMap::new(),
        };
        for (key, value) in partial {
            values.insert(key.clone(), value.clone());
        }

        let text = toml::to_string_pretty(&values).map_err(|e| ConfigError::Storage {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        atomic_write(&path, text.as_bytes()).map_err(|e| ConfigError::Storage {
            path,
            reason: e.to_string(),
        })
    }

    /// The on-disk location of a scope's document. Pure function of scope
    /// and owner.
    fn path_for(&self, scope: ConfigScope, owner: Option<&str>) -> Result<PathBuf, ConfigError> {
        match scope {
            ConfigScope::SystemDefault => Ok(self.root.join("system.toml")),
            ConfigScope::UserGlobal => Ok(self.root.join("config.toml")),
            ConfigScope::ShellSession => {
                let owner = owner.ok_or(ConfigError::MissingOwner { scope })?;
                Ok(self
                    .root
                    .join("shell")
                    .join(format!("{}.toml", sanitize_shell_id(owner))))
            }
            ConfigScope::SessionSpecific => {
                let owner = owner.ok_or(ConfigError::MissingOwner { scope })?;
                let dir = paths::session_dir(&self.root.join("sessions"), owner).map_err(|e| {
                    ConfigError::Storage {
                        path: self.root.join("sessions"),
                        reason: e.to_string(),
                    }
                })?;
                Ok(dir.join(SESSION_CONFIG_FILE))
            }
            ConfigScope::Environment | ConfigScope::Cli => {
                Err(ConfigError::UnbackedScope { scope })
            }
        }
    }
}

/// Shell ids come from the ambient environment (tty names, process-group
/// ids) and may contain separators; map anything path-hostile to `-` so the
/// id stays a single file name.
fn sanitize_shell_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
