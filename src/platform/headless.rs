//! In-memory display server.
//!
//! Holds output, CRTC and mode descriptors for a set of virtual desktops and
//! answers [`DescriptorQuery`] from them. Mutators return the protocol event
//! a real server would send for the change, so a driver can feed them
//! straight into the topology model.

use std::collections::HashMap;

use crate::core::topology::{
    Connection, CrtcId, CrtcInfo, DescriptorQuery, DesktopDescriptor, ModeId, ModeInfo, MonitorInfo, OutputId,
    OutputInfo, ProtocolEvent, RootId, Rotation,
};
use crate::util::geometry::{Rect, Size};

#[derive(Debug, Clone)]
struct RootState {
    size: Size,
    size_mm: Size,
    rotation: u16,
    outputs: Vec<OutputId>,
    monitors: Option<Vec<MonitorInfo>>,
    primary: Option<OutputId>,
    work_area: Option<Rect>,
    resources: Option<String>,
    modes: HashMap<ModeId, ModeInfo>,
}

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    roots: Vec<(RootId, RootState)>,
    outputs: HashMap<OutputId, OutputInfo>,
    crtcs: HashMap<CrtcId, CrtcInfo>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, root: RootId, size: Size, size_mm: Size) -> &mut Self {
        self.roots.push((
            root,
            RootState {
                size,
                size_mm,
                rotation: Rotation::ROTATE_0,
                outputs: Vec::new(),
                monitors: None,
                primary: None,
                work_area: None,
                resources: None,
                modes: HashMap::new(),
            },
        ));
        self
    }

    fn root_mut(&mut self, root: RootId) -> Option<&mut RootState> {
        self.roots.iter_mut().find(|(id, _)| *id == root).map(|(_, state)| state)
    }

    fn root(&self, root: RootId) -> Option<&RootState> {
        self.roots.iter().find(|(id, _)| *id == root).map(|(_, state)| state)
    }

    /// Register a mode with standard 60Hz-ish timings scaled to `refresh` Hz.
    pub fn add_mode(&mut self, root: RootId, mode: ModeId, width: u16, height: u16, refresh: u32) -> &mut Self {
        let htotal = width.saturating_add(160);
        let vtotal = height.saturating_add(45);
        let info = ModeInfo {
            id: mode,
            width,
            height,
            dot_clock: htotal as u32 * vtotal as u32 * refresh,
            htotal,
            vtotal,
        };
        if let Some(state) = self.root_mut(root) {
            state.modes.insert(mode, info);
        }
        self
    }

    /// Register a connected output scanning out `geometry` through `crtc`.
    pub fn add_output(
        &mut self,
        root: RootId,
        output: OutputId,
        name: &str,
        crtc: CrtcId,
        mode: ModeId,
        geometry: Rect,
        size_mm: Size,
    ) -> &mut Self {
        self.outputs.insert(
            output,
            OutputInfo {
                name: name.to_string(),
                connection: Connection::Connected,
                crtc: Some(crtc),
                size_mm,
            },
        );
        self.crtcs.insert(
            crtc,
            CrtcInfo {
                geometry,
                rotation: Rotation::ROTATE_0,
                mode: Some(mode),
            },
        );
        if let Some(state) = self.root_mut(root) {
            state.outputs.push(output);
        }
        self
    }

    pub fn set_primary(&mut self, root: RootId, output: Option<OutputId>) -> &mut Self {
        if let Some(state) = self.root_mut(root) {
            state.primary = output;
        }
        self
    }

    pub fn set_monitors(&mut self, root: RootId, monitors: Option<Vec<MonitorInfo>>) -> &mut Self {
        if let Some(state) = self.root_mut(root) {
            state.monitors = monitors;
        }
        self
    }

    /// Startup descriptors for every root, in registration order.
    pub fn descriptors(&self) -> Vec<DesktopDescriptor> {
        self.roots
            .iter()
            .map(|(root, state)| DesktopDescriptor {
                root: *root,
                size: state.size,
                size_mm: state.size_mm,
                rotation: state.rotation,
                outputs: state.outputs.clone(),
                monitors: state.monitors.clone(),
            })
            .collect()
    }

    // =========================================================================
    // Changes
    // =========================================================================

    /// Unplug an output.
    pub fn disconnect(&mut self, root: RootId, output: OutputId) -> ProtocolEvent {
        let crtc = self.outputs.get_mut(&output).and_then(|info| {
            info.connection = Connection::Disconnected;
            info.crtc.take()
        });
        if let Some(crtc) = crtc {
            self.crtcs.remove(&crtc);
        }
        if let Some(state) = self.root_mut(root) {
            state.outputs.retain(|&o| o != output);
            if state.primary == Some(output) {
                state.primary = None;
            }
        }
        ProtocolEvent::OutputChanged {
            root,
            output,
            crtc: None,
            mode: None,
            connection: Connection::Disconnected,
        }
    }

    /// Plug in an output and enable it. Returns the output notification.
    #[allow(clippy::too_many_arguments)]
    pub fn connect(
        &mut self,
        root: RootId,
        output: OutputId,
        name: &str,
        crtc: CrtcId,
        mode: ModeId,
        geometry: Rect,
        size_mm: Size,
    ) -> ProtocolEvent {
        self.add_output(root, output, name, crtc, mode, geometry, size_mm);
        ProtocolEvent::OutputChanged {
            root,
            output,
            crtc: Some(crtc),
            mode: Some(mode),
            connection: Connection::Connected,
        }
    }

    /// Detach an output from its CRTC without unplugging it.
    pub fn disable(&mut self, root: RootId, output: OutputId) -> ProtocolEvent {
        if let Some(crtc) = self.outputs.get_mut(&output).and_then(|info| info.crtc.take()) {
            self.crtcs.remove(&crtc);
        }
        ProtocolEvent::OutputChanged {
            root,
            output,
            crtc: None,
            mode: None,
            connection: Connection::Connected,
        }
    }

    /// Reprogram a CRTC. `geometry` is the rotated scanout rectangle.
    pub fn configure_crtc(
        &mut self,
        root: RootId,
        crtc: CrtcId,
        geometry: Rect,
        rotation: Rotation,
        mode: ModeId,
    ) -> ProtocolEvent {
        self.crtcs.insert(
            crtc,
            CrtcInfo {
                geometry,
                rotation: rotation.to_randr(),
                mode: Some(mode),
            },
        );
        let unrotated = if rotation.swaps_axes() { geometry.transposed() } else { geometry };
        ProtocolEvent::CrtcChanged {
            root,
            crtc,
            geometry: unrotated,
            rotation: rotation.to_randr(),
            mode: Some(mode),
        }
    }

    pub fn publish_work_area(&mut self, root: RootId, work_area: Option<Rect>) -> ProtocolEvent {
        if let Some(state) = self.root_mut(root) {
            state.work_area = work_area;
        }
        ProtocolEvent::WorkAreaChanged { root }
    }

    pub fn publish_resources(&mut self, root: RootId, database: &str) -> ProtocolEvent {
        if let Some(state) = self.root_mut(root) {
            state.resources = Some(database.to_string());
        }
        ProtocolEvent::ResourcesChanged { root }
    }

    /// Forget a mode so later queries for it fail.
    pub fn remove_mode(&mut self, root: RootId, mode: ModeId) {
        if let Some(state) = self.root_mut(root) {
            state.modes.remove(&mode);
        }
    }
}

impl DescriptorQuery for HeadlessDisplay {
    fn output_info(&self, output: OutputId) -> Option<OutputInfo> {
        self.outputs.get(&output).cloned()
    }

    fn crtc_info(&self, crtc: CrtcId) -> Option<CrtcInfo> {
        self.crtcs.get(&crtc).copied()
    }

    fn mode_info(&self, root: RootId, mode: ModeId) -> Option<ModeInfo> {
        self.root(root)?.modes.get(&mode).copied()
    }

    fn primary_output(&self, root: RootId) -> Option<OutputId> {
        self.root(root)?.primary
    }

    fn work_area(&self, root: RootId) -> Option<Rect> {
        self.root(root)?.work_area
    }

    fn resource_database(&self, root: RootId) -> Option<String> {
        self.root(root)?.resources.clone()
    }
}
