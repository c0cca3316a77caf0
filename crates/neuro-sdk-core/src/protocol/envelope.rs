//! Message envelope (JSON).
//!
//! The core stores `data` as `RawValue` so the payload is only parsed once the
//! command is known.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{NeuroError, Result};

/// Command names used on the wire.
pub mod command {
    // outbound
    pub const STARTUP: &str = "startup";
    pub const CONTEXT: &str = "context";
    pub const ACTIONS_REGISTER: &str = "actions/register";
    pub const ACTIONS_UNREGISTER: &str = "actions/unregister";
    pub const ACTIONS_FORCE: &str = "actions/force";
    pub const ACTION_RESULT: &str = "action/result";
    pub const SHUTDOWN_READY: &str = "shutdown/ready";

    // inbound
    pub const ACTION: &str = "action";
    pub const ACTIONS_REREGISTER_ALL: &str = "actions/reregister_all";
}

/// One wire message.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Command name (e.g. `actions/register`).
    pub command: String,
    /// Game identifier. Overwritten by the engine before every send.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub game: String,
    /// Optional command-specific payload, stored as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

impl Envelope {
    /// Envelope without payload.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            game: String::new(),
            data: None,
        }
    }

    /// Envelope carrying `data` serialized once into raw JSON.
    pub fn with_data<T: Serialize>(command: impl Into<String>, data: &T) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(data)
            .map_err(|e| NeuroError::Decode(format!("payload encode failed: {e}")))?;
        Ok(Self {
            command: command.into(),
            game: String::new(),
            data: Some(raw),
        })
    }

    /// Decode an envelope from a text frame.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| NeuroError::Decode(format!("invalid envelope json: {e}")))
    }

    /// Encode the envelope for a text frame.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NeuroError::Decode(format!("envelope encode failed: {e}")))
    }

    /// Parse the payload into `T`. A missing payload is an error.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self.data.as_ref().ok_or_else(|| {
            NeuroError::Decode(format!("{} requires data", self.command))
        })?;
        serde_json::from_str(raw.get())
            .map_err(|e| NeuroError::Decode(format!("{} invalid data: {e}", self.command)))
    }
}
