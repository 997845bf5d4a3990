//! A physical output (or placeholder) attached to a virtual desktop.
//!
//! The screen owns the derived per-output state: geometry clipped to the
//! work area, physical size under rotation, orientation and refresh rate.
//! Update methods report what changed; the topology model turns that into
//! notifications.

use crate::core::errors::{Descriptor, TopologyError};
use crate::util::geometry::{size_in_millimeters, Dpi, Rect, Size};

use super::query::{DescriptorQuery, MonitorInfo, OutputInfo};
use super::types::{CrtcId, ModeId, Orientation, OutputId, RootId, Rotation, ScreenId};

/// Desktop-wide values a screen needs while reconciling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesktopMetrics {
    pub size: Size,
    pub size_mm: Size,
    /// `None` when no valid work area is published
    pub work_area: Option<Rect>,
    /// Physical DPI of the whole desktop
    pub dpi: Dpi,
}

impl DesktopMetrics {
    pub fn available_geometry(&self, geometry: Rect) -> Rect {
        match &self.work_area {
            Some(work_area) => geometry.intersected(work_area),
            None => geometry,
        }
    }
}

/// What an update touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenChanges {
    /// Geometry or available geometry differ from before
    pub geometry: bool,
    pub orientation: bool,
}

/// Monitor a screen is bound to when the desktop is driven by monitor lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorBinding {
    pub name: String,
    pub outputs: Vec<OutputId>,
}

#[derive(Debug, Clone)]
pub struct Screen {
    id: ScreenId,
    desktop: usize,
    output: Option<OutputId>,
    crtc: Option<CrtcId>,
    mode: Option<ModeId>,
    monitor: Option<MonitorBinding>,
    name: String,
    geometry: Rect,
    available_geometry: Rect,
    /// Size reported by the output, before rotation
    output_size_mm: Size,
    size_mm: Size,
    rotation: Rotation,
    orientation: Orientation,
    refresh_rate: f64,
    primary: bool,
}

impl Screen {
    fn blank(id: ScreenId, desktop: usize, refresh_rate: f64) -> Self {
        Self {
            id,
            desktop,
            output: None,
            crtc: None,
            mode: None,
            monitor: None,
            name: placeholder_name(desktop),
            geometry: Rect::zero(),
            available_geometry: Rect::zero(),
            output_size_mm: Size::zero(),
            size_mm: Size::zero(),
            rotation: Rotation::Normal,
            orientation: Orientation::Landscape,
            refresh_rate,
            primary: false,
        }
    }

    /// Screen standing in for a desktop without outputs.
    pub(crate) fn placeholder(id: ScreenId, desktop: usize, metrics: &DesktopMetrics, refresh_rate: f64) -> Self {
        let mut screen = Self::blank(id, desktop, refresh_rate);
        screen.finish_setup(metrics);
        screen
    }

    /// Screen bound to an output; geometry is established by the caller.
    pub(crate) fn for_output(
        id: ScreenId,
        desktop: usize,
        output: OutputId,
        info: &OutputInfo,
        refresh_rate: f64,
    ) -> Self {
        let mut screen = Self::blank(id, desktop, refresh_rate);
        screen.set_output(Some((output, info)));
        screen
    }

    /// Screen bound to a monitor; geometry is established by the caller.
    pub(crate) fn for_monitor(id: ScreenId, desktop: usize, monitor: &MonitorInfo, refresh_rate: f64) -> Self {
        let mut screen = Self::blank(id, desktop, refresh_rate);
        screen.bind_monitor(Some(monitor), None);
        screen
    }

    /// Fill in whatever the descriptors left empty from desktop-wide values.
    pub(crate) fn finish_setup(&mut self, metrics: &DesktopMetrics) {
        if self.geometry.is_empty() {
            self.geometry = Rect::from_size(metrics.size);
        }
        if self.available_geometry.is_empty() {
            self.available_geometry = metrics.available_geometry(self.geometry);
        }
        if self.size_mm.is_empty() {
            self.size_mm = metrics.size_mm;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Index of the owning virtual desktop
    pub fn desktop(&self) -> usize {
        self.desktop
    }

    pub fn output(&self) -> Option<OutputId> {
        self.output
    }

    pub fn crtc(&self) -> Option<CrtcId> {
        self.crtc
    }

    pub fn mode(&self) -> Option<ModeId> {
        self.mode
    }

    pub fn monitor(&self) -> Option<&MonitorBinding> {
        self.monitor.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn available_geometry(&self) -> Rect {
        self.available_geometry
    }

    pub fn output_size_mm(&self) -> Size {
        self.output_size_mm
    }

    pub fn size_mm(&self) -> Size {
        self.size_mm
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn refresh_rate(&self) -> f64 {
        self.refresh_rate
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// A placeholder has neither an output nor a monitor behind it.
    pub fn is_placeholder(&self) -> bool {
        self.output.is_none() && self.monitor.is_none()
    }

    /// DPI from this screen's own pixel and physical size.
    pub fn physical_dpi(&self) -> Dpi {
        Dpi::from_physical(self.geometry.size(), self.size_mm)
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Rebind to another output, or to none to become a placeholder.
    ///
    /// Geometry is kept; the mode is forgotten so the next refresh-rate
    /// update always re-queries.
    pub(crate) fn set_output(&mut self, output: Option<(OutputId, &OutputInfo)>) {
        self.monitor = None;
        self.mode = None;
        match output {
            Some((output, info)) => {
                self.output = Some(output);
                self.crtc = info.crtc;
                self.name = info.name.clone();
                self.output_size_mm = info.size_mm;
            }
            None => {
                self.output = None;
                self.crtc = None;
                self.name = placeholder_name(self.desktop);
            }
        }
    }

    /// Rebind to a monitor, or to none to become a placeholder.
    pub(crate) fn bind_monitor(&mut self, monitor: Option<&MonitorInfo>, crtc: Option<CrtcId>) {
        match monitor {
            Some(monitor) => {
                self.output = monitor.outputs.first().copied();
                self.crtc = crtc;
                self.name = monitor.name.clone();
                self.output_size_mm = monitor.size_mm;
                self.monitor = Some(MonitorBinding {
                    name: monitor.name.clone(),
                    outputs: monitor.outputs.clone(),
                });
            }
            None => {
                self.set_output(None);
            }
        }
    }

    pub(crate) fn set_crtc(&mut self, crtc: Option<CrtcId>) {
        self.crtc = crtc;
    }

    pub(crate) fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Apply a new scanout rectangle and rotation.
    ///
    /// `geometry` is used as given; callers transpose it for 90/270 degree
    /// rotations when their source reports unrotated mode sizes.
    pub fn update_geometry(&mut self, geometry: Rect, rotation: Rotation, metrics: &DesktopMetrics) -> ScreenChanges {
        let old_orientation = self.orientation;
        let old_geometry = (self.geometry, self.available_geometry);

        self.rotation = rotation;
        self.orientation = rotation.orientation();
        self.size_mm = if rotation.swaps_axes() {
            self.output_size_mm.transposed()
        } else {
            self.output_size_mm
        };

        // Physical size can be missing (VNC, some projectors); derive it
        // from the desktop DPI instead of reporting nothing.
        if self.size_mm.is_empty() {
            self.size_mm = size_in_millimeters(geometry.size(), metrics.dpi);
        }

        self.geometry = geometry;
        self.available_geometry = metrics.available_geometry(geometry);

        ScreenChanges {
            geometry: old_geometry != (self.geometry, self.available_geometry),
            orientation: old_orientation != self.orientation,
        }
    }

    /// Re-clip against the desktop work area. Returns whether it changed.
    pub fn update_available_geometry(&mut self, metrics: &DesktopMetrics) -> bool {
        let available = metrics.available_geometry(self.geometry);
        if available == self.available_geometry {
            return false;
        }
        self.available_geometry = available;
        true
    }

    /// Recompute the refresh rate for `mode`.
    ///
    /// Returns `Ok(None)` without querying when the mode is unchanged.
    pub fn update_refresh_rate(
        &mut self,
        root: RootId,
        mode: ModeId,
        query: &dyn DescriptorQuery,
    ) -> Result<Option<f64>, TopologyError> {
        if self.mode == Some(mode) {
            return Ok(None);
        }
        let info = query
            .mode_info(root, mode)
            .ok_or(TopologyError::DescriptorUnavailable(Descriptor::Mode(mode)))?;
        self.refresh_rate = info.refresh_rate();
        self.mode = Some(mode);
        Ok(Some(self.refresh_rate))
    }
}

fn placeholder_name(desktop: usize) -> String {
    format!("placeholder-{}", desktop)
}
