//! Scoped configuration storage and precedence resolution for Quill.
//!
//! Configuration for one invocation is merged from six scopes, lowest to
//! highest precedence:
//!
//! 1. **System default** — shipped `system.toml`, read-only
//! 2. **User global** — `config.toml` under the Quill root
//! 3. **Environment** — a fixed set of `QUILL_*` variables
//! 4. **Shell session** — `shell/<shell_id>.toml`, keyed by a
//!    terminal/process-group identifier supplied by the caller
//! 5. **Session specific** — `config.toml` inside the session directory
//! 6. **CLI** — per-invocation overrides, always win
//!
//! [`ConfigStore`] is pure persistence (merge-writes, atomic replace,
//! explicit absence); [`PrecedenceResolver`] owns the merge policy and
//! produces one frozen [`EffectiveConfig`] per invocation.

pub mod context;
pub mod env;
pub mod resolver;
pub mod store;

pub use context::InvocationContext;
pub use env::{ENV_KEY_MAP, capture_environment, environment_from};
pub use resolver::{EffectiveConfig, PrecedenceResolver};
pub use store::ConfigStore;
