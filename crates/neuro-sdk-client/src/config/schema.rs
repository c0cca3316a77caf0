use neuro_sdk_core::error::{NeuroError, Result};
use serde::Deserialize;

pub const DEFAULT_WEBSOCKET_URL: &str = "ws://localhost:8000";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Game identifier stamped on every outbound envelope.
    pub game: String,

    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,

    /// Delay between an action window's registration and its force request.
    #[serde(default = "default_force_grace_ms")]
    pub force_grace_ms: u64,

    /// Capacity of the asynchronous error stream.
    #[serde(default = "default_error_buffer")]
    pub error_buffer: usize,
}

impl ClientConfig {
    /// Config with both required fields and defaults for the rest.
    pub fn new(game: impl Into<String>, websocket_url: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            websocket_url: websocket_url.into(),
            force_grace_ms: default_force_grace_ms(),
            error_buffer: default_error_buffer(),
        }
    }

    pub fn with_force_grace_ms(mut self, ms: u64) -> Self {
        self.force_grace_ms = ms;
        self
    }

    pub fn with_error_buffer(mut self, capacity: usize) -> Self {
        self.error_buffer = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.trim().is_empty() {
            return Err(NeuroError::Config("game name is required".into()));
        }
        if self.websocket_url.trim().is_empty() {
            return Err(NeuroError::Config("websocket URL is required".into()));
        }
        if self.force_grace_ms > 10_000 {
            return Err(NeuroError::Config(
                "force_grace_ms must be at most 10000".into(),
            ));
        }
        if self.error_buffer == 0 {
            return Err(NeuroError::Config("error_buffer must be at least 1".into()));
        }
        Ok(())
    }
}

fn default_websocket_url() -> String {
    DEFAULT_WEBSOCKET_URL.into()
}
fn default_force_grace_ms() -> u64 {
    100
}
fn default_error_buffer() -> usize {
    8
}
