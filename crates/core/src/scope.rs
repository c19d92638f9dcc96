//! Configuration scopes — the six precedence levels a value can come from.
//!
//! Precedence is strictly total and encoded in the variant order, so the
//! derived `Ord` *is* the precedence relation: a value from a higher scope
//! always wins over a lower one for the same key.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Where a configuration value originates, lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigScope {
    /// Shipped defaults, read-only.
    SystemDefault,
    /// The user's long-lived global document.
    UserGlobal,
    /// Fixed environment-variable mapping, read-only.
    Environment,
    /// Bound to a terminal/process-group lifetime, keyed by a shell id.
    ShellSession,
    /// Owned by one hierarchical session.
    SessionSpecific,
    /// Per-invocation overrides, always win.
    Cli,
}

impl ConfigScope {
    /// All scopes in ascending precedence order.
    pub const ASCENDING: [ConfigScope; 6] = [
        ConfigScope::SystemDefault,
        ConfigScope::UserGlobal,
        ConfigScope::Environment,
        ConfigScope::ShellSession,
        ConfigScope::SessionSpecific,
        ConfigScope::Cli,
    ];

    /// The CLI-facing name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigScope::SystemDefault => "system-default",
            ConfigScope::UserGlobal => "user-global",
            ConfigScope::Environment => "environment",
            ConfigScope::ShellSession => "shell-session",
            ConfigScope::SessionSpecific => "session-specific",
            ConfigScope::Cli => "cli",
        }
    }

    /// Whether a scope requires an owner id (session path or shell id) to
    /// locate its document.
    pub fn requires_owner(&self) -> bool {
        matches!(
            self,
            ConfigScope::ShellSession | ConfigScope::SessionSpecific
        )
    }
}

impl std::fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system-default" => Ok(ConfigScope::SystemDefault),
            "user-global" => Ok(ConfigScope::UserGlobal),
            "environment" => Ok(ConfigScope::Environment),
            "shell-session" => Ok(ConfigScope::ShellSession),
            "session-specific" => Ok(ConfigScope::SessionSpecific),
            "cli" => Ok(ConfigScope::Cli),
            other => Err(ConfigError::UnknownScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order_is_total_and_ascending() {
        let scopes = ConfigScope::ASCENDING;
        for (i, lower) in scopes.iter().enumerate() {
            for higher in &scopes[i + 1..] {
                assert!(lower < higher, "{lower} should rank below {higher}");
            }
        }
        assert_eq!(scopes[0], ConfigScope::SystemDefault);
        assert_eq!(scopes[5], ConfigScope::Cli);
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for scope in ConfigScope::ASCENDING {
            let parsed: ConfigScope = scope.as_str().parse().unwrap();
            assert_eq!(parsed, scope);
        }
    }

    #[test]
    fn unknown_scope_name_rejected() {
        let err = "global".parse::<ConfigScope>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScope(_)));
    }

    #[test]
    fn owner_requirement() {
        assert!(ConfigScope::ShellSession.requires_owner());
        assert!(ConfigScope::SessionSpecific.requires_owner());
        assert!(!ConfigScope::UserGlobal.requires_owner());
        assert!(!ConfigScope::Cli.requires_owner());
    }
}
