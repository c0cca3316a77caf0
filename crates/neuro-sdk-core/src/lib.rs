//! neuro-sdk core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts (envelopes, action
//! definitions, force requests, results) and the error surface shared by the
//! client engine and host integrations. It carries no transport or runtime
//! dependencies.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here; malformed peer
//! input surfaces as `NeuroError` instead.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, NeuroError, Result};
