//! The environment scope — a fixed, documented set of variables mapped 1:1
//! to config keys, consumed read-only by the resolver.

use quill_core::{ConfigDocument, ConfigScope};

/// Environment variable → config key. This mapping is static and owned
/// here; nothing else in the subsystem reads ad-hoc environment state.
pub const ENV_KEY_MAP: &[(&str, &str)] = &[
    ("QUILL_SESSION", "session"),
    ("QUILL_SYSTEM_STRING", "system_string"),
    ("QUILL_API_URL", "api_url"),
    ("QUILL_MODEL", "model"),
];

/// Capture the environment scope from the process environment.
pub fn capture_environment() -> ConfigDocument {
    environment_from(std::env::vars())
}

/// Build the environment scope from explicit variables. Unknown variables
/// are ignored; only the fixed mapping is consulted.
pub fn environment_from<I>(vars: I) -> ConfigDocument
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut doc = ConfigDocument::empty(ConfigScope::Environment);
    for (var, value) in vars {
        if let Some((_, key)) = ENV_KEY_MAP.iter().find(|(name, _)| *name == var) {
            doc.set(*key, value);
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ConfigValue;

    #[test]
    fn mapped_variables_become_keys() {
        let doc = environment_from([
            ("QUILL_SESSION".to_string(), "scratch".to_string()),
            ("QUILL_MODEL".to_string(), "haiku".to_string()),
        ]);
        assert_eq!(
            doc.get("session").and_then(ConfigValue::as_str),
            Some("scratch")
        );
        assert_eq!(doc.get("model").and_then(ConfigValue::as_str), Some("haiku"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn unmapped_variables_are_ignored() {
        let doc = environment_from([
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("QUILL_UNKNOWN".to_string(), "x".to_string()),
        ]);
        assert!(doc.is_empty());
    }

    #[test]
    fn document_is_tagged_with_environment_scope() {
        let doc = environment_from(std::iter::empty());
        assert_eq!(doc.scope, ConfigScope::Environment);
    }
}
