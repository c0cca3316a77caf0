//! neuro-sdk client library.
//!
//! This crate wires the WebSocket transport, the action registry and the
//! background read loop into a connection engine a game integration embeds.
//! It is consumed by host games, by the demo binary (`main.rs`) and by the
//! integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod obs;
pub mod transport;
pub mod window;

pub use config::ClientConfig;
pub use dispatch::{ActionHandler, ActionRegistry, SharedHandler, Validation};
pub use engine::{Client, ErrorStream};
pub use obs::ClientMetrics;
pub use window::{ActionWindow, WindowState};
