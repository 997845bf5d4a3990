//! Incoming protocol events and outgoing screen notifications.

use crate::util::geometry::{Dpi, Rect, Size};

use super::query::MonitorInfo;
use super::types::{Connection, CrtcId, ModeId, Orientation, OutputId, RootId, ScreenId};

/// Topology change delivered by the display server, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// An output's connection, CRTC or mode changed
    OutputChanged {
        root: RootId,
        output: OutputId,
        crtc: Option<CrtcId>,
        mode: Option<ModeId>,
        connection: Connection,
    },
    /// A CRTC was reconfigured. `geometry` carries the unrotated mode size.
    CrtcChanged {
        root: RootId,
        crtc: CrtcId,
        geometry: Rect,
        rotation: u16,
        mode: Option<ModeId>,
    },
    /// The monitor list of a desktop was replaced
    MonitorsChanged {
        root: RootId,
        monitors: Vec<MonitorInfo>,
    },
    /// The root window was resized or rotated
    ScreenChanged {
        root: RootId,
        rotation: u16,
        size: Size,
        size_mm: Size,
    },
    /// The window manager published a new work area
    WorkAreaChanged { root: RootId },
    /// The resource database was rewritten
    ResourcesChanged { root: RootId },
}

impl ProtocolEvent {
    pub fn root(&self) -> RootId {
        match self {
            ProtocolEvent::OutputChanged { root, .. }
            | ProtocolEvent::CrtcChanged { root, .. }
            | ProtocolEvent::MonitorsChanged { root, .. }
            | ProtocolEvent::ScreenChanged { root, .. }
            | ProtocolEvent::WorkAreaChanged { root }
            | ProtocolEvent::ResourcesChanged { root } => *root,
        }
    }
}

/// Notification for the windowing layer
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    ScreenAdded { screen: ScreenId, primary: bool },
    ScreenRemoved { screen: ScreenId },
    GeometryChanged { screen: ScreenId, geometry: Rect, available_geometry: Rect },
    OrientationChanged { screen: ScreenId, orientation: Orientation },
    RefreshRateChanged { screen: ScreenId, rate: f64 },
    PrimaryScreenChanged { screen: ScreenId },
    LogicalDpiChanged { screen: ScreenId, dpi: Dpi },
}

impl ScreenEvent {
    pub fn screen(&self) -> ScreenId {
        match self {
            ScreenEvent::ScreenAdded { screen, .. }
            | ScreenEvent::ScreenRemoved { screen }
            | ScreenEvent::GeometryChanged { screen, .. }
            | ScreenEvent::OrientationChanged { screen, .. }
            | ScreenEvent::RefreshRateChanged { screen, .. }
            | ScreenEvent::PrimaryScreenChanged { screen }
            | ScreenEvent::LogicalDpiChanged { screen, .. } => *screen,
        }
    }

    /// Hand this event to the matching sink method.
    pub fn deliver(self, sink: &mut dyn NotificationSink) {
        match self {
            ScreenEvent::ScreenAdded { screen, primary } => sink.screen_added(screen, primary),
            ScreenEvent::ScreenRemoved { screen } => sink.screen_removed(screen),
            ScreenEvent::GeometryChanged { screen, geometry, available_geometry } => {
                sink.geometry_changed(screen, geometry, available_geometry)
            }
            ScreenEvent::OrientationChanged { screen, orientation } => sink.orientation_changed(screen, orientation),
            ScreenEvent::RefreshRateChanged { screen, rate } => sink.refresh_rate_changed(screen, rate),
            ScreenEvent::PrimaryScreenChanged { screen } => sink.primary_screen_changed(screen),
            ScreenEvent::LogicalDpiChanged { screen, dpi } => sink.logical_dpi_changed(screen, dpi),
        }
    }
}

/// Receiver of screen notifications (the windowing layer).
pub trait NotificationSink {
    fn screen_added(&mut self, screen: ScreenId, primary: bool);

    fn screen_removed(&mut self, screen: ScreenId);

    fn geometry_changed(&mut self, screen: ScreenId, geometry: Rect, available_geometry: Rect);

    fn orientation_changed(&mut self, screen: ScreenId, orientation: Orientation);

    fn refresh_rate_changed(&mut self, screen: ScreenId, rate: f64);

    fn primary_screen_changed(&mut self, screen: ScreenId);

    fn logical_dpi_changed(&mut self, _screen: ScreenId, _dpi: Dpi) {}
}

/// Recording sink, useful for platforms that batch notifications.
impl NotificationSink for Vec<ScreenEvent> {
    fn screen_added(&mut self, screen: ScreenId, primary: bool) {
        self.push(ScreenEvent::ScreenAdded { screen, primary });
    }

    fn screen_removed(&mut self, screen: ScreenId) {
        self.push(ScreenEvent::ScreenRemoved { screen });
    }

    fn geometry_changed(&mut self, screen: ScreenId, geometry: Rect, available_geometry: Rect) {
        self.push(ScreenEvent::GeometryChanged { screen, geometry, available_geometry });
    }

    fn orientation_changed(&mut self, screen: ScreenId, orientation: Orientation) {
        self.push(ScreenEvent::OrientationChanged { screen, orientation });
    }

    fn refresh_rate_changed(&mut self, screen: ScreenId, rate: f64) {
        self.push(ScreenEvent::RefreshRateChanged { screen, rate });
    }

    fn primary_screen_changed(&mut self, screen: ScreenId) {
        self.push(ScreenEvent::PrimaryScreenChanged { screen });
    }

    fn logical_dpi_changed(&mut self, screen: ScreenId, dpi: Dpi) {
        self.push(ScreenEvent::LogicalDpiChanged { screen, dpi });
    }
}
