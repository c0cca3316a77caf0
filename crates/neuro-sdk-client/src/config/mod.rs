//! Client config loader (strict parsing).

pub mod schema;

use std::env;
use std::fs;

use neuro_sdk_core::error::{NeuroError, Result};

pub use schema::{ClientConfig, DEFAULT_WEBSOCKET_URL};

pub const ENV_GAME: &str = "NEURO_GAME";
pub const ENV_WEBSOCKET_URL: &str = "NEURO_SDK_WS_URL";

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| NeuroError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| NeuroError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Build a config from `NEURO_GAME` / `NEURO_SDK_WS_URL`.
///
/// `fallback_game` is used when `NEURO_GAME` is unset; the URL falls back to
/// the local default endpoint.
pub fn from_env(fallback_game: &str) -> Result<ClientConfig> {
    let game = env::var(ENV_GAME).unwrap_or_else(|_| fallback_game.to_string());
    let url = env::var(ENV_WEBSOCKET_URL)
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let cfg = ClientConfig::new(game, url);
    cfg.validate()?;
    Ok(cfg)
}
