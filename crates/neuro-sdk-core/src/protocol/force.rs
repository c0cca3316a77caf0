//! Forced-action requests (`actions/force`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Urgency of a force request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional knobs of a force request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForceOptions {
    /// Free-form state description; omitted from the payload when unset.
    pub state: Option<String>,
    /// Context of this force is not kept by the peer afterwards.
    pub ephemeral_context: bool,
    pub priority: Priority,
}

impl ForceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_ephemeral_context(mut self, ephemeral: bool) -> Self {
        self.ephemeral_context = ephemeral;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// `actions/force` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceRequest {
    pub query: String,
    pub action_names: Vec<String>,
    pub ephemeral_context: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ForceRequest {
    pub fn new(query: impl Into<String>, action_names: Vec<String>, opts: ForceOptions) -> Self {
        Self {
            query: query.into(),
            action_names,
            ephemeral_context: opts.ephemeral_context,
            priority: opts.priority,
            // An empty state string is treated as unset.
            state: opts.state.filter(|s| !s.is_empty()),
        }
    }
}
