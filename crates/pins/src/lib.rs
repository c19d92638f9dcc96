//! Pinned context for Quill — storage, templates, rendering.
//!
//! A pin is a persistent snippet (system/user/assistant) re-injected into
//! every LLM request in a session. [`PinStore`] owns the per-session (or
//! user-global) pin file with per-role capacity enforcement;
//! [`Template`] is the minimal `<: $name :>` interpolation engine; and
//! [`PinRenderer`] turns a pin set into the system prompt and seed
//! messages per the configured render mode.

pub mod render;
pub mod store;
pub mod template;

pub use render::{PinRenderer, RenderConfig, RenderedPrompt, SeedMessage};
pub use store::{PinRef, PinStore};
pub use template::Template;
