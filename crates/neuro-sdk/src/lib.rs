//! Top-level facade crate for neuro-sdk.
//!
//! Re-exports the protocol core and the client engine so game integrations
//! can depend on a single crate.

pub mod core {
    pub use neuro_sdk_core::*;
}

pub mod client {
    pub use neuro_sdk_client::*;
}

pub use neuro_sdk_client::{
    ActionHandler, ActionWindow, Client, ClientConfig, SharedHandler, Validation, WindowState,
};
pub use neuro_sdk_core::protocol::{ActionSchema, ForceOptions, Priority};
pub use neuro_sdk_core::{ErrorKind, NeuroError, Result};
