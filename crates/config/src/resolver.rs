//! PrecedenceResolver — merges the six config scopes into one frozen
//! effective view.
//!
//! Ascending order: system-default, user-global, environment,
//! shell-session, session-specific, then CLI overrides unconditionally
//! last. Merging is at key granularity throughout. A corrupt document
//! downgrades to a warning and an empty scope — the invocation continues;
//! storage failures (permissions, disk) propagate.

use std::collections::BTreeMap;
use tracing::warn;

use quill_core::error::ConfigError;
use quill_core::{ConfigScope, ConfigValue, PinLimits, PinMethod, Role};

use crate::context::InvocationContext;
use crate::store::ConfigStore;

/// The merged configuration for one invocation. Immutable once computed;
/// no re-resolution happens mid-request.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl EffectiveConfig {
    /// Build directly from merged values (tests, embedding).
    pub fn from_values(values: BTreeMap<String, ConfigValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// String value for `key`; present-but-wrong-shape is a coercion
    /// error, absence is `Ok(None)`.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        self.coerce(key, "string", ConfigValue::as_str)
    }

    pub fn get_integer(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.coerce(key, "integer", ConfigValue::as_integer)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.coerce(key, "bool", ConfigValue::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Result<Option<&[String]>, ConfigError> {
        self.coerce(key, "list", ConfigValue::as_list)
    }

    fn coerce<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        accessor: impl Fn(&'a ConfigValue) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => accessor(value).map(Some).ok_or(ConfigError::Coercion {
                key: key.to_string(),
                expected,
                found: value.type_name(),
            }),
        }
    }

    // --- Well-known keys ---

    /// The base system prompt (or system prompt template, in vars modes).
    pub fn system_string(&self) -> Result<Option<&str>, ConfigError> {
        self.get_str("system_string")
    }

    /// The session selected by config, if any. The hardcoded `default`
    /// fallback belongs to the caller, not to this subsystem.
    pub fn default_session(&self) -> Result<Option<&str>, ConfigError> {
        self.get_str("session")
    }

    /// Per-role pin capacity from `pin_limits.<role>`, defaulting to 50.
    pub fn pin_limit(&self, role: Role) -> Result<usize, ConfigError> {
        let key = format!("pin_limits.{role}");
        match self.get_integer(&key)? {
            None => Ok(PinLimits::DEFAULT_PER_ROLE),
            Some(n) => usize::try_from(n).map_err(|_| ConfigError::Coercion {
                key,
                expected: "non-negative integer",
                found: "integer",
            }),
        }
    }

    /// All three role capacities at once.
    pub fn pin_limits(&self) -> Result<PinLimits, ConfigError> {
        Ok(PinLimits {
            system: self.pin_limit(Role::System)?,
            user: self.pin_limit(Role::User)?,
            assistant: self.pin_limit(Role::Assistant)?,
        })
    }

    /// Per-role render mode override from `pin_mode_<role>`. `Ok(None)`
    /// when unset; an unknown mode name is a coercion error.
    pub fn pin_mode(&self, role: Role) -> Result<Option<PinMethod>, ConfigError> {
        let key = format!("pin_mode_{role}");
        match self.get_str(&key)? {
            None => Ok(None),
            Some(name) => name.parse().map(Some).map_err(|_| ConfigError::Coercion {
                key,
                expected: "pin method name",
                found: "string",
            }),
        }
    }

    /// Per-role render template from `pin_tpl_<role>` (user/assistant
    /// vars modes).
    pub fn pin_template(&self, role: Role) -> Result<Option<&str>, ConfigError> {
        self.get_str(&format!("pin_tpl_{role}"))
    }
}

/// Merges scope documents read through a [`ConfigStore`] plus the
/// invocation context.
#[derive(Debug)]
pub struct PrecedenceResolver<'a> {
    store: &'a ConfigStore,
}

impl<'a> PrecedenceResolver<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Resolve the effective configuration for `session` under `ctx`.
    ///
    /// Each static scope is read tolerating absence as empty; corrupt
    /// documents are warned about and treated as empty rather than
    /// failing the invocation.
    pub fn resolve(
        &self,
        session: &str,
        ctx: &InvocationContext,
    ) -> Result<EffectiveConfig, ConfigError> {
        let mut merged: BTreeMap<String, ConfigValue> = BTreeMap::new();

        for scope in ConfigScope::ASCENDING {
            match scope {
                ConfigScope::SystemDefault | ConfigScope::UserGlobal => {
                    self.apply_stored(&mut merged, scope, None)?;
                }
                ConfigScope::Environment => {
                    for (key, value) in &ctx.environment.values {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                ConfigScope::ShellSession => {
                    if let Some(shell_id) = ctx.shell_id.as_deref() {
                        self.apply_stored(&mut merged, scope, Some(shell_id))?;
                    }
                }
                ConfigScope::SessionSpecific => {
                    self.apply_stored(&mut merged, scope, Some(session))?;
                }
                ConfigScope::Cli => {
                    for (key, value) in &ctx.cli_overrides {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Ok(EffectiveConfig { values: merged })
    }

    fn apply_stored(
        &self,
        merged: &mut BTreeMap<String, ConfigValue>,
        scope: ConfigScope,
        owner: Option<&str>,
    ) -> Result<(), ConfigError> {
        let doc = match self.store.read(scope, owner) {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(()),
            Err(ConfigError::Corrupt { path, reason }) => {
                warn!(scope = %scope, path = %path.display(), %reason,
                      "corrupt config document, treating scope as empty");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        for (key, value) in &doc.values {
            merged.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::environment_from;
    use quill_core::ConfigDocument;
    use tempfile::tempdir;

    fn write_scope(
        store: &ConfigStore,
        scope: ConfigScope,
        owner: Option<&str>,
        pairs: &[(&str, &str)],
    ) {
        let partial: BTreeMap<String, ConfigValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ConfigValue::from(*v)))
            .collect();
        store.write(scope, owner, &partial).unwrap();
    }

    fn write_system_default(store: &ConfigStore, pairs: &[(&str, &str)]) {
        // The store refuses to write the shipped scope; tests plant the
        // file directly, as an installer would.
        let text: String = pairs
            .iter()
            .map(|(k, v)| format!("{k} = \"{v}\"\n"))
            .collect();
        std::fs::write(store.root().join("system.toml"), text).unwrap();
    }

    fn empty_ctx() -> InvocationContext {
        InvocationContext::with_environment(None, ConfigDocument::empty(ConfigScope::Environment))
    }

    #[test]
    fn highest_defining_scope_wins_across_the_chain() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        // Every scope defines "model"; each later layer must win.
        write_system_default(&store, &[("model", "m-system")]);
        let ctx = empty_ctx();
        let resolver = PrecedenceResolver::new(&store);
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-system"));

        write_scope(&store, ConfigScope::UserGlobal, None, &[("model", "m-user")]);
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-user"));

        let ctx = InvocationContext::with_environment(
            None,
            environment_from([("QUILL_MODEL".to_string(), "m-env".to_string())]),
        );
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-env"));

        write_scope(
            &store,
            ConfigScope::ShellSession,
            Some("tty1"),
            &[("model", "m-shell")],
        );
        let ctx = InvocationContext::with_environment(
            Some("tty1".into()),
            environment_from([("QUILL_MODEL".to_string(), "m-env".to_string())]),
        );
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-shell"));

        write_scope(
            &store,
            ConfigScope::SessionSpecific,
            Some("proj"),
            &[("model", "m-session")],
        );
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-session"));

        let ctx = ctx.with_override("model", "m-cli");
        let cfg = resolver.resolve("proj", &ctx).unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), Some("m-cli"));
    }

    #[test]
    fn missing_key_falls_through_to_lower_scope() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        write_scope(
            &store,
            ConfigScope::UserGlobal,
            None,
            &[("session", "default"), ("system_string", "low")],
        );
        // Higher scope sets an unrelated key only.
        write_scope(
            &store,
            ConfigScope::SessionSpecific,
            Some("proj"),
            &[("model", "opus")],
        );

        let cfg = PrecedenceResolver::new(&store)
            .resolve("proj", &empty_ctx())
            .unwrap();
        assert_eq!(cfg.get_str("system_string").unwrap(), Some("low"));
        assert_eq!(cfg.get_str("session").unwrap(), Some("default"));
        assert_eq!(cfg.get_str("model").unwrap(), Some("opus"));
    }

    #[test]
    fn cli_override_is_invocation_scoped_only() {
        // UserGlobal says A, one invocation overrides to B, the next
        // invocation sees A again.
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        write_scope(&store, ConfigScope::UserGlobal, None, &[("system_string", "A")]);

        let resolver = PrecedenceResolver::new(&store);
        let with_cli = empty_ctx().with_override("system_string", "B");
        let cfg = resolver.resolve("proj", &with_cli).unwrap();
        assert_eq!(cfg.get_str("system_string").unwrap(), Some("B"));

        let cfg = resolver.resolve("proj", &empty_ctx()).unwrap();
        assert_eq!(cfg.get_str("system_string").unwrap(), Some("A"));
    }

    #[test]
    fn corrupt_scope_is_warned_and_treated_as_empty() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        write_system_default(&store, &[("model", "fallback")]);
        std::fs::write(dir.path().join("config.toml"), "broken = [toml").unwrap();

        let cfg = PrecedenceResolver::new(&store)
            .resolve("proj", &empty_ctx())
            .unwrap();
        // Lower scope still visible; invocation did not fail.
        assert_eq!(cfg.get_str("model").unwrap(), Some("fallback"));
    }

    #[test]
    fn absent_keys_stay_absent() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let cfg = PrecedenceResolver::new(&store)
            .resolve("proj", &empty_ctx())
            .unwrap();
        assert!(cfg.is_empty());
        assert_eq!(cfg.get_str("system_string").unwrap(), None);
        assert_eq!(cfg.default_session().unwrap(), None);
    }

    #[test]
    fn shell_scope_skipped_without_shell_id() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        write_scope(
            &store,
            ConfigScope::ShellSession,
            Some("tty1"),
            &[("model", "shell")],
        );

        let cfg = PrecedenceResolver::new(&store)
            .resolve("proj", &empty_ctx())
            .unwrap();
        assert_eq!(cfg.get_str("model").unwrap(), None);
    }

    #[test]
    fn pin_limits_default_and_override() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let partial: BTreeMap<String, ConfigValue> =
            [("pin_limits.user".to_string(), ConfigValue::from(3i64))]
                .into_iter()
                .collect();
        store.write(ConfigScope::UserGlobal, None, &partial).unwrap();

        let cfg = PrecedenceResolver::new(&store)
            .resolve("proj", &empty_ctx())
            .unwrap();
        let limits = cfg.pin_limits().unwrap();
        assert_eq!(limits.user, 3);
        assert_eq!(limits.system, PinLimits::DEFAULT_PER_ROLE);
        assert_eq!(limits.assistant, PinLimits::DEFAULT_PER_ROLE);
    }

    #[test]
    fn wrong_shape_is_a_coercion_error_not_a_stringification() {
        let cfg = EffectiveConfig::from_values(
            [(
                "pin_limits.user".to_string(),
                ConfigValue::from("lots"),
            )]
            .into_iter()
            .collect(),
        );
        let err = cfg.pin_limit(Role::User).unwrap_err();
        assert!(matches!(err, ConfigError::Coercion { .. }));

        let err = cfg.get_integer("pin_limits.user").unwrap_err();
        assert!(matches!(err, ConfigError::Coercion { .. }));
    }

    #[test]
    fn pin_mode_parses_and_rejects_unknown_names() {
        let cfg = EffectiveConfig::from_values(
            [
                ("pin_mode_user".to_string(), ConfigValue::from("vars_first")),
                ("pin_mode_system".to_string(), ConfigValue::from("sideways")),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(cfg.pin_mode(Role::User).unwrap(), Some(PinMethod::VarsFirst));
        assert!(cfg.pin_mode(Role::System).is_err());
        assert_eq!(cfg.pin_mode(Role::Assistant).unwrap(), None);
    }
}
