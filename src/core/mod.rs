pub mod accessibility;
pub mod context;
pub mod errors;
pub mod runtime;
pub mod topology;

// Re-export key types
pub use context::Context;
pub use errors::{AccessibilityError, BridgeError, CoreError, TopologyError};
pub use runtime::{BridgeHandle, EventLoop, Job};
pub use topology::{TopologyModel, TopologySettings};
