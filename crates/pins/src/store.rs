//! PinStore — CRUD over per-role pinned snippets with capacity limits.
//!
//! One JSONL file per pin set (one per session, plus an optional
//! user-global set), loaded fully on open and rewritten atomically on
//! every mutation — there is no separate "save" step. The store never
//! discards user data on its own: a full role rejects new pins instead of
//! evicting, and an unparseable file is an error instead of a partial
//! load that would drop unreadable entries on the next rewrite.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use quill_core::error::PinError;
use quill_core::storage::atomic_write;
use quill_core::{Pin, PinLimits, PinMethod, Role};

/// Handle to a pin just added: its stable id plus the display position it
/// landed at within its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRef {
    pub id: String,
    pub role: Role,
    pub index: usize,
}

/// A loaded pin set bound to its backing file.
#[derive(Debug)]
pub struct PinStore {
    path: PathBuf,
    limits: PinLimits,
    /// Kept sorted by insertion order (`Pin::order`).
    pins: Vec<Pin>,
}

impl PinStore {
    /// Open the pin set at `path`. A missing file starts empty; the file
    /// is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>, limits: PinLimits) -> Result<Self, PinError> {
        let path = path.into();
        let mut pins = Self::load(&path)?;
        pins.sort_by_key(|p| p.order);
        debug!(path = %path.display(), count = pins.len(), "pin store loaded");
        Ok(Self { path, limits, pins })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Vec<Pin>, PinError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PinError::Storage {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let mut pins = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let pin: Pin = serde_json::from_str(line).map_err(|e| PinError::Corrupt {
                path: path.to_path_buf(),
                line: lineno + 1,
                reason: e.to_string(),
            })?;
            pins.push(pin);
        }
        Ok(pins)
    }

    fn flush(&self) -> Result<(), PinError> {
        let mut content = String::new();
        for pin in &self.pins {
            let line = serde_json::to_string(pin).map_err(|e| PinError::Storage {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            content.push_str(&line);
            content.push('\n');
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| PinError::Storage {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Add a pin. Fails with [`PinError::MethodNotAllowed`] for an invalid
    /// role/method pair and [`PinError::LimitExceeded`] when the role is at
    /// capacity — in both cases nothing changes, in memory or on disk.
    pub fn add(
        &mut self,
        role: Role,
        method: PinMethod,
        content: impl Into<String>,
    ) -> Result<PinRef, PinError> {
        if !method.allowed_for(role) {
            return Err(PinError::MethodNotAllowed { role, method });
        }
        let limit = self.limits.limit(role);
        if self.count(role) >= limit {
            return Err(PinError::LimitExceeded { role, limit });
        }

        let order = self.pins.iter().map(|p| p.order).max().map_or(0, |m| m + 1);
        let pin = Pin {
            id: Uuid::new_v4().to_string(),
            role,
            method,
            content: content.into(),
            order,
        };
        let id = pin.id.clone();
        self.pins.push(pin);

        if let Err(e) = self.flush() {
            self.pins.pop();
            return Err(e);
        }
        Ok(PinRef {
            id,
            role,
            index: self.count(role) - 1,
        })
    }

    /// Remove the pin at the current 0-based display position within
    /// `role`'s list. The position is resolved to the pin's stable id
    /// against this read — indices shift after a removal, matching the
    /// CLI's `--pin-rm <index>` semantics.
    pub fn remove(&mut self, role: Role, index: usize) -> Result<Pin, PinError> {
        let global_idx = self
            .pins
            .iter()
            .enumerate()
            .filter(|(_, p)| p.role == role)
            .map(|(i, _)| i)
            .nth(index)
            .ok_or(PinError::NotFound { role, index })?;

        let pin = self.pins.remove(global_idx);
        if let Err(e) = self.flush() {
            self.pins.insert(global_idx, pin);
            return Err(e);
        }
        Ok(pin)
    }

    /// Pins for one role in insertion order, or every role grouped
    /// system → user → assistant, insertion-ordered within each group.
    pub fn list(&self, role: Option<Role>) -> Vec<&Pin> {
        match role {
            Some(role) => self.pins.iter().filter(|p| p.role == role).collect(),
            None => Role::ALL
                .iter()
                .flat_map(|role| self.pins.iter().filter(move |p| p.role == *role))
                .collect(),
        }
    }

    /// Clear one role or everything. Returns how many pins were removed.
    pub fn clear(&mut self, role: Option<Role>) -> Result<usize, PinError> {
        let before = self.pins.len();
        let previous = match role {
            Some(role) => {
                let previous = self.pins.clone();
                self.pins.retain(|p| p.role != role);
                previous
            }
            None => std::mem::take(&mut self.pins),
        };
        let removed = before - self.pins.len();
        if removed == 0 {
            return Ok(0);
        }
        if let Err(e) = self.flush() {
            self.pins = previous;
            return Err(e);
        }
        Ok(removed)
    }

    pub fn count(&self, role: Role) -> usize {
        self.pins.iter().filter(|p| p.role == role).count()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
