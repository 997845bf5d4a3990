//! Platform Integration Module
//!
//! Platform adapters own the event thread and drive the core [`Context`]
//! from display-server events. The headless adapter runs the core against
//! an in-memory display and is used by the binary and the tests.
//!
//! [`Context`]: crate::core::Context

pub mod api;
pub mod headless;

pub use api::{HeadlessPlatform, LoggingSink, Platform};
pub use headless::HeadlessDisplay;
