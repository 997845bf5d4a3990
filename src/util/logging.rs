//! Standardized logging utility for skylight.
//!
//! This module provides the `slog!` macro which routes diagnostic records
//! through `tracing` tagged with a `[MODULE]` identifier, so the subscriber
//! installed by the binary renders them as
//! `YYYY-MM-DD HH:MM:SS LEVEL [MODULE] Message`.

#[macro_export]
macro_rules! slog {
    ($module:expr, $($arg:tt)*) => {{
        tracing::debug!("[{}] {}", $module, format!($($arg)*));
    }};
}

/// Timestamp format shared by the binary's subscriber.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Standardized module identifiers
pub const MAIN: &str = "MAIN";
pub const CORE: &str = "CORE";
pub const TOPOLOGY: &str = "TOPOLOGY";
pub const SCREEN: &str = "SCREEN";
pub const A11Y: &str = "A11Y";
pub const BRIDGE: &str = "BRIDGE";
pub const PLATFORM: &str = "PLATFORM";
