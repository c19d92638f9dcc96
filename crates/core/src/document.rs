//! Config documents — one flat key→value mapping per scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scope::ConfigScope;
use crate::value::ConfigValue;

/// A flat key→value configuration document, tagged with the scope it came
/// from and, for owned scopes, the owning identifier (session path or
/// shell id).
///
/// Only `values` is persisted; scope and owner are implied by the file's
/// location on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub scope: ConfigScope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// BTreeMap for deterministic serialization and stable diffs.
    pub values: BTreeMap<String, ConfigValue>,
}

impl ConfigDocument {
    /// An empty document for a scope.
    pub fn empty(scope: ConfigScope) -> Self {
        Self {
            scope,
            owner: None,
            values: BTreeMap::new(),
        }
    }

    /// An empty document for an owned scope (shell-session or
    /// session-specific).
    pub fn empty_owned(scope: ConfigScope, owner: impl Into<String>) -> Self {
        Self {
            scope,
            owner: Some(owner.into()),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Merge `other` into `self` at **key granularity**: every key `other`
    /// defines overwrites ours, every key it omits is left untouched. A
    /// document that sets only `system_string` never erases a `session`
    /// key set elsewhere.
    pub fn merge_from(&mut self, other: &ConfigDocument) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}
