//! InvocationContext — the per-invocation inputs to precedence resolution.
//!
//! Replaces ambient global state: the shell-session identifier and the
//! captured environment are resolved once by the caller and threaded
//! explicitly into the resolver, never read ad hoc mid-request.

use std::collections::BTreeMap;

use quill_core::{ConfigDocument, ConfigValue};

use crate::env;

/// Everything invocation-scoped that feeds the precedence chain.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Terminal/process-group identifier for the shell-session scope.
    /// Derived by the caller from its environment; `None` disables the
    /// scope for this invocation.
    pub shell_id: Option<String>,

    /// The captured environment scope document.
    pub environment: ConfigDocument,

    /// CLI overrides, applied unconditionally last.
    pub cli_overrides: BTreeMap<String, ConfigValue>,
}

impl InvocationContext {
    /// Capture the process environment and carry the given shell id.
    pub fn new(shell_id: Option<String>) -> Self {
        Self {
            shell_id,
            environment: env::capture_environment(),
            cli_overrides: BTreeMap::new(),
        }
    }

    /// A context with an explicit environment document (tests, embedding).
    pub fn with_environment(shell_id: Option<String>, environment: ConfigDocument) -> Self {
        Self {
            shell_id,
            environment,
            cli_overrides: BTreeMap::new(),
        }
    }

    /// Add a CLI override.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.cli_overrides.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ConfigScope;

    #[test]
    fn overrides_accumulate() {
        let ctx = InvocationContext::with_environment(
            None,
            ConfigDocument::empty(ConfigScope::Environment),
        )
        .with_override("system_string", "B")
        .with_override("model", "haiku");
        assert_eq!(ctx.cli_overrides.len(), 2);
    }

    #[test]
    fn shell_id_is_optional() {
        let ctx = InvocationContext::with_environment(
            Some("tty7".into()),
            ConfigDocument::empty(ConfigScope::Environment),
        );
        assert_eq!(ctx.shell_id.as_deref(), Some("tty7"));
    }
}
