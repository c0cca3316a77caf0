//! Outbound payload shapes for the remaining commands.

use serde::{Deserialize, Serialize};

use crate::protocol::action::ActionDefinition;

/// `context` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    pub message: String,
    /// Not surfaced to the peer's user-facing output, only its working memory.
    pub silent: bool,
}

/// `actions/register` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterData {
    pub actions: Vec<ActionDefinition>,
}

/// `actions/unregister` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnregisterData {
    pub action_names: Vec<String>,
}

/// `action/result` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResultData {
    pub id: String,
    pub success: bool,
    pub message: String,
}
