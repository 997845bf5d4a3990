//! Runtime configuration for the platform core.

use std::time::Duration;

use crate::core::accessibility::IdentityRange;

/// Environment variable forcing the logical font DPI on every screen.
pub const FONT_DPI_ENV: &str = "SKYLIGHT_FONT_DPI";
/// Environment variable selecting the virtual desktop that hosts the primary screen.
pub const PRIMARY_DESKTOP_ENV: &str = "SKYLIGHT_PRIMARY_DESKTOP";
/// Environment variable bounding cross-thread bridge calls, in milliseconds.
pub const BRIDGE_TIMEOUT_ENV: &str = "SKYLIGHT_BRIDGE_TIMEOUT_MS";

/// Configuration for the platform context
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Index of the virtual desktop allowed to host the primary screen
    pub primary_desktop: usize,
    /// Logical DPI override, applied before the resource database
    pub font_dpi_override: Option<u32>,
    /// Lowest logical DPI reported when falling back to physical metrics
    pub min_logical_dpi: f64,
    /// Refresh rate reported before a mode has been resolved
    pub default_refresh_rate: f64,
    /// Range accessibility identities are drawn from
    pub identity_range: IdentityRange,
    /// Upper bound on a blocking cross-thread accessibility request
    pub bridge_timeout: Duration,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            primary_desktop: 0,
            font_dpi_override: None,
            min_logical_dpi: 96.0,
            default_refresh_rate: 60.0,
            identity_range: IdentityRange::default(),
            bridge_timeout: Duration::from_millis(500),
        }
    }
}

impl PlatformConfig {
    /// Defaults overlaid with any `SKYLIGHT_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PlatformConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(FONT_DPI_ENV) {
            match value.trim().parse::<u32>() {
                Ok(dpi) if dpi > 0 => config.font_dpi_override = Some(dpi),
                _ => tracing::warn!("Ignoring invalid {}={:?}", FONT_DPI_ENV, value),
            }
        }
        if let Some(value) = lookup(PRIMARY_DESKTOP_ENV) {
            match value.trim().parse::<usize>() {
                Ok(index) => config.primary_desktop = index,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", PRIMARY_DESKTOP_ENV, value),
            }
        }
        if let Some(value) = lookup(BRIDGE_TIMEOUT_ENV) {
            match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.bridge_timeout = Duration::from_millis(ms),
                _ => tracing::warn!("Ignoring invalid {}={:?}", BRIDGE_TIMEOUT_ENV, value),
            }
        }

        config
    }
}
