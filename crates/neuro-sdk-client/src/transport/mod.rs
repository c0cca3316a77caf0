//! Transport layer (WebSocket).
//!
//! Exposes the dialer and the codec that decodes frames once before they
//! reach the dispatch loop.

pub mod codec;
pub mod ws;
