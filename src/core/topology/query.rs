//! Raw descriptors and the collaborator that fetches them.
//!
//! Descriptors are point-in-time snapshots; the topology model never keeps
//! one beyond the event it was fetched for.

use crate::util::geometry::{Rect, Size};

use super::types::{Connection, CrtcId, ModeId, OutputId, RootId};

/// Output attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    pub connection: Connection,
    pub crtc: Option<CrtcId>,
    /// Native physical size, independent of the current rotation
    pub size_mm: Size,
}

/// CRTC attributes. `geometry` is the scanned-out area, already rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrtcInfo {
    pub geometry: Rect,
    /// RandR rotation bitmask
    pub rotation: u16,
    pub mode: Option<ModeId>,
}

/// Mode timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    pub id: ModeId,
    pub width: u16,
    pub height: u16,
    /// Pixel clock in Hz
    pub dot_clock: u32,
    pub htotal: u16,
    pub vtotal: u16,
}

impl ModeInfo {
    /// Refresh rate in Hz; 0 when the mode has no timings.
    pub fn refresh_rate(&self) -> f64 {
        let dot_count = self.htotal as u32 * self.vtotal as u32;
        if dot_count == 0 {
            0.0
        } else {
            self.dot_clock as f64 / dot_count as f64
        }
    }
}

/// Logical monitor made of one or more outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub primary: bool,
    pub geometry: Rect,
    pub size_mm: Size,
    pub outputs: Vec<OutputId>,
}

/// Startup description of one virtual desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopDescriptor {
    pub root: RootId,
    pub size: Size,
    pub size_mm: Size,
    pub rotation: u16,
    /// Outputs to enumerate when `monitors` is not provided
    pub outputs: Vec<OutputId>,
    /// Monitor list, when the server supports monitor objects
    pub monitors: Option<Vec<MonitorInfo>>,
}

/// Fetches current descriptors from the display server.
///
/// `None` means the descriptor could not be fetched, usually because the
/// object vanished between the notification and the query.
pub trait DescriptorQuery {
    fn output_info(&self, output: OutputId) -> Option<OutputInfo>;

    fn crtc_info(&self, crtc: CrtcId) -> Option<CrtcInfo>;

    fn mode_info(&self, root: RootId, mode: ModeId) -> Option<ModeInfo>;

    fn primary_output(&self, root: RootId) -> Option<OutputId>;

    /// Work area of the desktop; `None` when the window manager publishes none.
    fn work_area(&self, root: RootId) -> Option<Rect>;

    /// Raw resource database text.
    fn resource_database(&self, root: RootId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_rate_from_timings() {
        // 1920x1080@60 CEA timing
        let mode = ModeInfo {
            id: ModeId(1),
            width: 1920,
            height: 1080,
            dot_clock: 148_500_000,
            htotal: 2200,
            vtotal: 1125,
        };
        assert!((mode.refresh_rate() - 60.0).abs() < 1e-9);

        let broken = ModeInfo { htotal: 0, ..mode };
        assert_eq!(broken.refresh_rate(), 0.0);
    }
}
