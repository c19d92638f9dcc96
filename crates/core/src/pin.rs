//! Pin domain types — persistent context snippets re-injected into every
//! LLM request in a session.
//!
//! A pin records the role it speaks as, the render method chosen when it
//! was added, and a store-wide monotonic insertion index. The `id` is a
//! stable uuid backing index-addressed removal: CLI-facing indices are
//! display positions resolved to ids at read time, never stored.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role a pin (or history entry) speaks as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::System, Role::User, Role::Assistant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// How a pin set is turned into prompt/message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMethod {
    /// Plain-text append (system) or one discrete message per pin
    /// (user/assistant).
    Concat,
    /// Joined pins substituted into a template placeholder.
    Vars,
    /// First pin fills the template, the rest become raw messages.
    /// User/assistant only.
    VarsFirst,
    /// Vars with a Concat fallback when the placeholder is absent.
    /// System only.
    Both,
}

impl PinMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinMethod::Concat => "concat",
            PinMethod::Vars => "vars",
            PinMethod::VarsFirst => "vars_first",
            PinMethod::Both => "both",
        }
    }

    /// Whether this method is valid for a role. System allows
    /// `concat | vars | both`; user and assistant allow
    /// `concat | vars | vars_first`.
    pub fn allowed_for(&self, role: Role) -> bool {
        match role {
            Role::System => matches!(self, PinMethod::Concat | PinMethod::Vars | PinMethod::Both),
            Role::User | Role::Assistant => matches!(
                self,
                PinMethod::Concat | PinMethod::Vars | PinMethod::VarsFirst
            ),
        }
    }
}

impl std::fmt::Display for PinMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concat" => Ok(PinMethod::Concat),
            "vars" => Ok(PinMethod::Vars),
            "vars_first" => Ok(PinMethod::VarsFirst),
            "both" => Ok(PinMethod::Both),
            other => Err(format!("unknown pin method: {other}")),
        }
    }
}

/// A single pinned snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Stable uuid, assigned at add time.
    pub id: String,

    pub role: Role,

    pub method: PinMethod,

    pub content: String,

    /// Store-wide monotonic insertion index. Ordering pins by `order`
    /// within a role yields insertion order, stable across reads.
    pub order: u64,
}

/// Per-role pin capacities. Defaults to 50 per role; overridden via the
/// `pin_limits.<role>` config keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLimits {
    pub system: usize,
    pub user: usize,
    pub assistant: usize,
}

impl PinLimits {
    pub const DEFAULT_PER_ROLE: usize = 50;

    pub fn limit(&self, role: Role) -> usize {
        match role {
            Role::System => self.system,
            Role::User => self.user,
            Role::Assistant => self.assistant,
        }
    }

    /// The same capacity for every role.
    pub fn uniform(limit: usize) -> Self {
        Self {
            system: limit,
            user: limit,
            assistant: limit,
        }
    }
}

impl Default for PinLimits {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_PER_ROLE)
    }
}
