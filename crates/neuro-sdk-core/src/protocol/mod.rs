//! Protocol modules.
//!
//! - `envelope`: the JSON envelope every frame carries, with a raw payload.
//! - `action`: action definitions/schemas, incoming invocations, results.
//! - `force`: priorities and forced-action requests.
//! - `payload`: the remaining outbound payload shapes.
//!
//! Decoding is panic-free: malformed peer input is reported as `NeuroError`.

pub mod action;
pub mod envelope;
pub mod force;
pub mod payload;

pub use action::{
    parse_action_data, ActionDefinition, ActionSchema, ExecutionResult, IncomingAction,
};
pub use envelope::{command, Envelope};
pub use force::{ForceOptions, ForceRequest, Priority};
pub use payload::{ActionResultData, ContextData, RegisterData, UnregisterData};
