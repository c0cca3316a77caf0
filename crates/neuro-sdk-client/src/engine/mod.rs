//! Connection engine: lifecycle, outbound operations and inbound dispatch.

mod client;
mod errors;
mod read_loop;

pub use client::Client;
pub use errors::ErrorStream;
