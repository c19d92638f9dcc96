//! History entries — one record per conversation turn, strictly
//! append-ordered per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pin::Role;

/// A single conversation log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,

    pub content: String,

    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// A user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// An assistant turn stamped now. Also used for partially-streamed
    /// responses cut short by an interrupt — partial content is appended,
    /// never discarded.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
