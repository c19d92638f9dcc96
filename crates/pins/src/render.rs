//! PinRenderer — turns a pin set into the system prompt and seed messages
//! for one LLM request.
//!
//! Each role renders under one effective mode: the `pin_mode_<role>`
//! config override when set, otherwise the method recorded on that role's
//! first pin, otherwise concat. Template failures are fatal for the
//! render — an uninjected prompt sent silently is worse than a loud
//! error.

use std::collections::BTreeMap;

use quill_core::error::RenderError;
use quill_core::{Pin, PinMethod, Role};

use crate::template::Template;

/// The variable name pin templates substitute.
pub const PINS_VAR: &str = "pins_str";

/// Fallback template for user/assistant vars modes when no
/// `pin_tpl_<role>` is configured: pass the joined pins through.
pub const DEFAULT_ROLE_TEMPLATE: &str = "<: $pins_str :>";

/// Delimiter between joined pins.
const PIN_SEPARATOR: &str = "\n";

/// A synthetic message injected ahead of the live user query.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedMessage {
    pub role: Role,
    pub content: String,
}

/// The rendered result: final system prompt plus seed messages in the
/// order they should precede the live query (user pins, then assistant
/// pins).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system_prompt: String,
    pub seed_messages: Vec<SeedMessage>,
}

/// Render-time inputs extracted from the effective configuration.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// The base system prompt; treated as a template in vars/both modes.
    pub base_system: String,
    /// Per-role mode overrides (`pin_mode_<role>` keys).
    pub system_mode: Option<PinMethod>,
    pub user_mode: Option<PinMethod>,
    pub assistant_mode: Option<PinMethod>,
    /// Per-role templates for user/assistant vars modes
    /// (`pin_tpl_<role>` keys).
    pub user_template: Option<String>,
    pub assistant_template: Option<String>,
}

/// Stateless renderer — create one per invocation and reuse it.
#[derive(Debug)]
pub struct PinRenderer {
    config: RenderConfig,
}

impl PinRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render `pins` into a prompt. Pin order within each role is
    /// insertion order and is preserved throughout.
    pub fn render(&self, pins: &[Pin]) -> Result<RenderedPrompt, RenderError> {
        let system: Vec<&Pin> = pins.iter().filter(|p| p.role == Role::System).collect();
        let user: Vec<&Pin> = pins.iter().filter(|p| p.role == Role::User).collect();
        let assistant: Vec<&Pin> = pins.iter().filter(|p| p.role == Role::Assistant).collect();

        let system_prompt = self.render_system(&system)?;

        let mut seed_messages = Vec::new();
        self.render_role(Role::User, &user, &mut seed_messages)?;
        self.render_role(Role::Assistant, &assistant, &mut seed_messages)?;

        Ok(RenderedPrompt {
            system_prompt,
            seed_messages,
        })
    }

    fn effective_mode(&self, role: Role, pins: &[&Pin]) -> Result<PinMethod, RenderError> {
        let configured = match role {
            Role::System => self.config.system_mode,
            Role::User => self.config.user_mode,
            Role::Assistant => self.config.assistant_mode,
        };
        let method = configured
            .or_else(|| pins.first().map(|p| p.method))
            .unwrap_or(PinMethod::Concat);
        if !method.allowed_for(role) {
            return Err(RenderError::InvalidMode { role, method });
        }
        Ok(method)
    }

    fn render_system(&self, pins: &[&Pin]) -> Result<String, RenderError> {
        let base = self.config.base_system.as_str();
        let mode = self.effective_mode(Role::System, pins)?;
        let joined = join_pins(pins);

        match mode {
            // Append as plain text; the base is never parsed in concat
            // mode.
            PinMethod::Concat => {
                if pins.is_empty() {
                    Ok(base.to_string())
                } else {
                    Ok(concat_append(base, &joined))
                }
            }
            // The base opts in by carrying the placeholder; without it
            // the pins are simply not injected.
            PinMethod::Vars => {
                let template = Template::parse(base)?;
                template.render(&pin_vars(joined))
            }
            // Substitute when the placeholder is present, otherwise fall
            // back to the concat append — pins land exactly once.
            PinMethod::Both => {
                let template = Template::parse(base)?;
                if template.contains_var(PINS_VAR) {
                    template.render(&pin_vars(joined))
                } else if pins.is_empty() {
                    Ok(base.to_string())
                } else {
                    Ok(concat_append(base, &joined))
                }
            }
            PinMethod::VarsFirst => unreachable!("rejected by effective_mode"),
        }
    }

    fn render_role(
        &self,
        role: Role,
        pins: &[&Pin],
        out: &mut Vec<SeedMessage>,
    ) -> Result<(), RenderError> {
        if pins.is_empty() {
            return Ok(());
        }
        let mode = self.effective_mode(role, pins)?;

        match mode {
            // One discrete message per pin, insertion order.
            PinMethod::Concat => {
                for pin in pins {
                    out.push(SeedMessage {
                        role,
                        content: pin.content.clone(),
                    });
                }
            }
            // All pins joined into exactly one templated message.
            PinMethod::Vars => {
                let rendered = self.role_template(role)?.render(&pin_vars(join_pins(pins)))?;
                out.push(SeedMessage {
                    role,
                    content: rendered,
                });
            }
            // The first pin carries the framing template; the rest are
            // raw few-shot content.
            PinMethod::VarsFirst => {
                let first = self
                    .role_template(role)?
                    .render(&pin_vars(pins[0].content.clone()))?;
                out.push(SeedMessage {
                    role,
                    content: first,
                });
                for pin in &pins[1..] {
                    out.push(SeedMessage {
                        role,
                        content: pin.content.clone(),
                    });
                }
            }
            PinMethod::Both => unreachable!("rejected by effective_mode"),
        }
        Ok(())
    }

    fn role_template(&self, role: Role) -> Result<Template, RenderError> {
        let configured = match role {
            Role::User => self.config.user_template.as_deref(),
            Role::Assistant => self.config.assistant_template.as_deref(),
            Role::System => None,
        };
        Template::parse(configured.unwrap_or(DEFAULT_ROLE_TEMPLATE))
    }
}

fn join_pins(pins: &[&Pin]) -> String {
    pins.iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join(PIN_SEPARATOR)
}

fn concat_append(base: &str, joined: &str) -> String {
    if base.is_empty() {
        joined.to_string()
    } else {
        format!("{base}{PIN_SEPARATOR}{joined}")
    }
}

fn pin_vars(joined: String) -> BTreeMap<&'static str, String> {
    let mut vars = BTreeMap::new();
    vars.insert(PINS_VAR, joined);
    vars
}
