//! Action handler capability and the registry the engine dispatches through.

pub mod handler;
pub mod registry;

pub use handler::{ActionHandler, SharedHandler, Validation};
pub use registry::ActionRegistry;
