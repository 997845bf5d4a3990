//! Topology model: the virtual-desktop -> screen forest.
//!
//! Protocol events are reconciled into screen additions, removals and
//! per-screen updates. Notifications are queued on the model and drained
//! by the windowing layer with `take_events` or `dispatch_events`.

use crate::config::PlatformConfig;
use crate::core::errors::{Descriptor, TopologyError};
use crate::util::geometry::{Dpi, Rect, Size};
use crate::util::logging::TOPOLOGY;

use super::desktop::VirtualDesktop;
use super::events::{NotificationSink, ProtocolEvent, ScreenEvent};
use super::query::{DesktopDescriptor, DescriptorQuery, MonitorInfo, OutputInfo};
use super::resources::XResources;
use super::screen::{DesktopMetrics, Screen, ScreenChanges};
use super::types::{Connection, CrtcId, ModeId, OutputId, RootId, Rotation, ScreenId};

/// What an `OutputChanged` notification means for a given output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTransition {
    /// Unknown output became connected with a CRTC and mode
    Enable,
    /// Known output changed CRTC, mode or position
    Update,
    /// Known output lost both its CRTC and mode but is still connected
    Disable,
    /// Known output was unplugged
    Disconnect,
    /// Nothing to do
    Ignore,
}

impl OutputTransition {
    pub fn classify(known: bool, crtc: Option<CrtcId>, mode: Option<ModeId>, connection: Connection) -> Self {
        let enabled = crtc.is_some() && mode.is_some();
        let cleared = crtc.is_none() && mode.is_none();
        match (known, connection) {
            (true, Connection::Disconnected) => OutputTransition::Disconnect,
            (true, _) if cleared => OutputTransition::Disable,
            (true, _) => OutputTransition::Update,
            (false, Connection::Connected) if enabled => OutputTransition::Enable,
            (false, _) => OutputTransition::Ignore,
        }
    }
}

/// Settings the model reads from [`PlatformConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologySettings {
    pub primary_desktop: usize,
    pub font_dpi_override: Option<u32>,
    pub min_logical_dpi: f64,
    pub default_refresh_rate: f64,
}

impl From<&PlatformConfig> for TopologySettings {
    fn from(config: &PlatformConfig) -> Self {
        Self {
            primary_desktop: config.primary_desktop,
            font_dpi_override: config.font_dpi_override,
            min_logical_dpi: config.min_logical_dpi,
            default_refresh_rate: config.default_refresh_rate,
        }
    }
}

impl Default for TopologySettings {
    fn default() -> Self {
        Self::from(&PlatformConfig::default())
    }
}

#[derive(Debug)]
pub struct TopologyModel {
    settings: TopologySettings,
    desktops: Vec<VirtualDesktop>,
    events: Vec<ScreenEvent>,
    next_screen_id: u32,
}

impl TopologyModel {
    // =========================================================================
    // Startup
    // =========================================================================

    /// Enumerate desktops and their screens.
    ///
    /// Every desktop ends up with at least one screen (a placeholder if no
    /// output is usable). `ScreenAdded` is queued for each screen, primary
    /// desktop first, primary screen first.
    pub fn initialize(
        settings: TopologySettings,
        descriptors: Vec<DesktopDescriptor>,
        query: &dyn DescriptorQuery,
    ) -> Result<Self, TopologyError> {
        if descriptors.is_empty() {
            return Err(TopologyError::NoDesktops);
        }
        if settings.primary_desktop >= descriptors.len() {
            return Err(TopologyError::InvalidPrimaryDesktop {
                index: settings.primary_desktop,
                count: descriptors.len(),
            });
        }

        let mut model = Self {
            settings,
            desktops: Vec::with_capacity(descriptors.len()),
            events: Vec::new(),
            next_screen_id: 1,
        };

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let desktop = model.enumerate_desktop(index, descriptor, query);
            model.desktops.push(desktop);
        }

        let primary = settings.primary_desktop;
        let order = std::iter::once(primary).chain((0..model.desktops.len()).filter(|&i| i != primary));
        for index in order {
            for screen in &model.desktops[index].screens {
                model.events.push(ScreenEvent::ScreenAdded {
                    screen: screen.id(),
                    primary: screen.is_primary(),
                });
            }
        }

        tracing::info!(
            "[{}] Initialized {} desktop(s), {} screen(s)",
            TOPOLOGY,
            model.desktops.len(),
            model.screen_count()
        );
        Ok(model)
    }

    fn enumerate_desktop(
        &mut self,
        index: usize,
        descriptor: DesktopDescriptor,
        query: &dyn DescriptorQuery,
    ) -> VirtualDesktop {
        let root = descriptor.root;
        let hosts_primary = index == self.settings.primary_desktop;
        let mut desktop = VirtualDesktop::new(index, root, descriptor.size, descriptor.size_mm, hosts_primary);
        desktop.rotation = Rotation::from_randr(descriptor.rotation).unwrap_or_default();
        desktop.set_work_area(query.work_area(root));
        if let Some(database) = query.resource_database(root) {
            desktop.resources = XResources::parse(&database);
        }
        let metrics = desktop.metrics();

        let mut primary_id = None;
        match &descriptor.monitors {
            Some(monitors) => {
                for monitor in monitors {
                    let screen = self.build_monitor_screen(index, root, monitor, &metrics, query);
                    if monitor.primary {
                        primary_id = Some(screen.id());
                    }
                    desktop.screens.push(screen);
                }
            }
            None => {
                let primary_output = if hosts_primary { query.primary_output(root) } else { None };
                for &output in &descriptor.outputs {
                    let Some(info) = query.output_info(output) else {
                        crate::slog!(TOPOLOGY, "Skipping output {}: no output info", output.0);
                        continue;
                    };
                    if info.connection != Connection::Connected || info.crtc.is_none() {
                        continue;
                    }
                    let screen = self.build_output_screen(index, root, output, &info, None, &metrics, query);
                    if primary_output == Some(output) {
                        primary_id = Some(screen.id());
                    }
                    desktop.screens.push(screen);
                }
            }
        }

        if desktop.screens.is_empty() {
            let id = self.allocate_screen_id();
            desktop
                .screens
                .push(Screen::placeholder(id, index, &metrics, self.settings.default_refresh_rate));
            crate::slog!(TOPOLOGY, "Desktop {} has no usable outputs, using placeholder {}", index, id);
        }

        if hosts_primary {
            let position = primary_id.and_then(|id| desktop.position(id)).unwrap_or(0);
            desktop.set_primary_screen(position);
        }
        desktop
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn settings(&self) -> &TopologySettings {
        &self.settings
    }

    pub fn desktops(&self) -> &[VirtualDesktop] {
        &self.desktops
    }

    pub fn desktop(&self, index: usize) -> Option<&VirtualDesktop> {
        self.desktops.get(index)
    }

    pub fn desktop_for_root(&self, root: RootId) -> Option<&VirtualDesktop> {
        self.desktops.iter().find(|d| d.root() == root)
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.desktops.iter().find_map(|d| d.screen(id))
    }

    /// All screens, primary desktop first, each desktop in list order.
    pub fn screens(&self) -> Vec<&Screen> {
        let primary = self.settings.primary_desktop;
        let mut screens: Vec<&Screen> = self.desktops[primary].screens.iter().collect();
        for desktop in self.desktops.iter().filter(|d| d.index() != primary) {
            screens.extend(desktop.screens.iter());
        }
        screens
    }

    pub fn screen_count(&self) -> usize {
        self.desktops.iter().map(|d| d.screens.len()).sum()
    }

    pub fn primary_screen(&self) -> Option<&Screen> {
        self.desktops[self.settings.primary_desktop].primary_screen()
    }

    pub fn logical_dpi(&self, id: ScreenId) -> Option<Dpi> {
        let screen = self.screen(id)?;
        let desktop = &self.desktops[screen.desktop()];
        Some(desktop.logical_dpi(self.settings.font_dpi_override, self.settings.min_logical_dpi))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Take queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<ScreenEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Deliver queued notifications to `sink`, oldest first.
    pub fn dispatch_events(&mut self, sink: &mut dyn NotificationSink) {
        for event in self.take_events() {
            event.deliver(sink);
        }
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    /// Reconcile one protocol event.
    ///
    /// Events for unknown roots are ignored. When a descriptor cannot be
    /// fetched the event is abandoned; the error is logged and returned, and
    /// the model stays as it was before the failing step.
    pub fn handle_event(&mut self, event: ProtocolEvent, query: &dyn DescriptorQuery) -> Result<(), TopologyError> {
        let Some(index) = self.desktops.iter().position(|d| d.root() == event.root()) else {
            crate::slog!(TOPOLOGY, "Ignoring event for foreign root {}", event.root().0);
            return Ok(());
        };

        let result = match event {
            ProtocolEvent::OutputChanged { root, output, crtc, mode, connection } => {
                self.handle_output_change(index, root, output, crtc, mode, connection, query)
            }
            ProtocolEvent::CrtcChanged { root, crtc, geometry, rotation, mode } => {
                self.handle_crtc_change(index, root, crtc, geometry, rotation, mode, query)
            }
            ProtocolEvent::MonitorsChanged { root, monitors } => {
                self.handle_monitors_change(index, root, &monitors, query);
                Ok(())
            }
            ProtocolEvent::ScreenChanged { rotation, size, size_mm, .. } => {
                self.handle_screen_change(index, rotation, size, size_mm);
                Ok(())
            }
            ProtocolEvent::WorkAreaChanged { root } => {
                self.update_work_area(index, query.work_area(root));
                Ok(())
            }
            ProtocolEvent::ResourcesChanged { root } => self.update_resources(index, root, query),
        };

        if let Err(e) = &result {
            tracing::debug!("[{}] Abandoned event on desktop {}: {}", TOPOLOGY, index, e);
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_output_change(
        &mut self,
        index: usize,
        root: RootId,
        output: OutputId,
        crtc: Option<CrtcId>,
        mode: Option<ModeId>,
        connection: Connection,
        query: &dyn DescriptorQuery,
    ) -> Result<(), TopologyError> {
        let existing = self.desktops[index].screen_for_output(output).map(|s| s.id());
        let transition = OutputTransition::classify(existing.is_some(), crtc, mode, connection);
        crate::slog!(
            TOPOLOGY,
            "Output {} change: crtc={:?} mode={:?} {:?} -> {:?}",
            output.0, crtc, mode, connection, transition
        );

        match (transition, existing, crtc, mode) {
            (OutputTransition::Enable, _, Some(crtc), Some(mode)) => {
                let info = fetch_output(query, output)?;
                let placeholder = self.desktops[index].placeholder().map(|s| s.id());
                match placeholder {
                    Some(id) => {
                        if let Some(screen) = self.desktops[index].screen_mut(id) {
                            screen.set_output(Some((output, &info)));
                        }
                        crate::slog!(TOPOLOGY, "Output {} connected, reusing placeholder {}", info.name, id);
                        self.update_screen(index, id, root, output, Some(crtc), Some(mode), query)
                    }
                    None => {
                        self.create_screen(index, root, output, &info, crtc, query);
                        Ok(())
                    }
                }
            }
            (OutputTransition::Update, Some(id), crtc, mode) => {
                self.update_screen(index, id, root, output, crtc, mode, query)
            }
            (OutputTransition::Disable, Some(id), _, _) => {
                let info = fetch_output(query, output)?;
                if info.crtc.is_none() {
                    crate::slog!(TOPOLOGY, "Output {} disabled", info.name);
                    self.destroy_screen(index, id);
                } else if let Some(screen) = self.desktops[index].screen_mut(id) {
                    // Mode switch in progress: detach from the CRTC so its
                    // intermediate notifications are not applied.
                    crate::slog!(TOPOLOGY, "Output {} temporarily disabled for a mode switch", info.name);
                    screen.set_crtc(None);
                }
                Ok(())
            }
            (OutputTransition::Disconnect, Some(id), _, _) => {
                crate::slog!(TOPOLOGY, "Output {} disconnected", output.0);
                self.destroy_screen(index, id);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_crtc_change(
        &mut self,
        index: usize,
        root: RootId,
        crtc: CrtcId,
        geometry: Rect,
        rotation: u16,
        mode: Option<ModeId>,
        query: &dyn DescriptorQuery,
    ) -> Result<(), TopologyError> {
        let Some(mode) = mode else {
            return Ok(());
        };
        let metrics = self.desktops[index].metrics();
        let Some(screen) = self.desktops[index].screens.iter_mut().find(|s| s.crtc() == Some(crtc)) else {
            return Ok(());
        };

        let rotation = Rotation::from_randr(rotation).unwrap_or(screen.rotation());
        let geometry = if rotation.swaps_axes() { geometry.transposed() } else { geometry };
        let changes = screen.update_geometry(geometry, rotation, &metrics);
        push_changes(&mut self.events, screen, changes);

        let refresh = screen.update_refresh_rate(root, mode, query);
        push_refresh(&mut self.events, screen.id(), refresh)
    }

    fn handle_monitors_change(
        &mut self,
        index: usize,
        root: RootId,
        monitors: &[MonitorInfo],
        query: &dyn DescriptorQuery,
    ) {
        let metrics = self.desktops[index].metrics();
        let hosts_primary = self.desktops[index].hosts_primary();
        let previous_primary = self.desktops[index].primary_screen().map(|s| s.id());
        let mut stale: Vec<ScreenId> = self.desktops[index].screens.iter().map(|s| s.id()).collect();
        let mut order = Vec::with_capacity(monitors.len());
        let mut added = Vec::new();
        let mut monitor_primary = None;

        for monitor in monitors {
            let matched = self.desktops[index].screen_for_monitor(&monitor.name).map(|s| s.id());
            // An unmatched monitor takes over the placeholder, if there is one.
            let reused = match matched {
                Some(_) => None,
                None => self.desktops[index].placeholder().map(|s| s.id()),
            };
            let id = match matched.or(reused) {
                Some(id) => {
                    stale.retain(|&s| s != id);
                    if reused.is_some() {
                        crate::slog!(TOPOLOGY, "Monitor {} connected, reusing placeholder {}", monitor.name, id);
                    }
                    self.apply_monitor(index, id, root, monitor, &metrics, query);
                    id
                }
                None => {
                    let screen = self.build_monitor_screen(index, root, monitor, &metrics, query);
                    let id = screen.id();
                    self.desktops[index].screens.push(screen);
                    added.push(id);
                    id
                }
            };
            order.push(id);
            if monitor.primary {
                monitor_primary = Some(id);
            }
        }

        if order.is_empty() {
            // Keep the first old screen alive as a placeholder.
            if let Some(keep) = stale.first().copied() {
                stale.retain(|&s| s != keep);
                if let Some(screen) = self.desktops[index].screen_mut(keep) {
                    screen.bind_monitor(None, None);
                }
                crate::slog!(TOPOLOGY, "Desktop {} has no monitors, {} is now a placeholder", index, keep);
                order.push(keep);
            } else {
                let id = self.allocate_screen_id();
                let refresh = self.settings.default_refresh_rate;
                self.desktops[index].screens.push(Screen::placeholder(id, index, &metrics, refresh));
                added.push(id);
                order.push(id);
            }
        }

        // Removed screens stay in the list until notifications are sent.
        let desktop = &mut self.desktops[index];
        let keep_order: Vec<ScreenId> = order.iter().chain(stale.iter()).copied().collect();
        desktop.reorder(&keep_order);

        let mut primary_changed = None;
        if hosts_primary {
            let target = monitor_primary
                .or(previous_primary.filter(|id| order.contains(id)))
                .unwrap_or(order[0]);
            if let Some(position) = desktop.position(target) {
                desktop.set_primary_screen(position);
            }
            if previous_primary != Some(target) && !added.contains(&target) {
                primary_changed = Some(target);
            }
        }

        for id in &added {
            let primary = desktop.screen(*id).is_some_and(|s| s.is_primary());
            self.events.push(ScreenEvent::ScreenAdded { screen: *id, primary });
        }
        if let Some(id) = primary_changed {
            self.events.push(ScreenEvent::PrimaryScreenChanged { screen: id });
        }
        for id in stale {
            desktop.remove_screen(id);
            crate::slog!(TOPOLOGY, "Monitor for {} is gone", id);
            self.events.push(ScreenEvent::ScreenRemoved { screen: id });
        }
    }

    fn handle_screen_change(&mut self, index: usize, rotation: u16, size: Size, size_mm: Size) {
        let desktop = &mut self.desktops[index];
        let rotation = Rotation::from_randr(rotation).unwrap_or(desktop.rotation());
        if !desktop.handle_screen_change(rotation, size, size_mm) {
            return;
        }
        crate::slog!(TOPOLOGY, "Desktop {} rotated to {:?}, now {:?}", index, rotation, desktop.size());
        let dpi = desktop.logical_dpi(self.settings.font_dpi_override, self.settings.min_logical_dpi);
        for screen in &desktop.screens {
            self.events.push(ScreenEvent::LogicalDpiChanged { screen: screen.id(), dpi });
        }
    }

    /// Apply a newly fetched work area and re-clip every screen of the desktop.
    pub fn update_work_area(&mut self, index: usize, work_area: Option<Rect>) {
        let Some(desktop) = self.desktops.get_mut(index) else {
            return;
        };
        if !desktop.set_work_area(work_area) {
            return;
        }
        let metrics = desktop.metrics();
        for screen in &mut desktop.screens {
            if screen.update_available_geometry(&metrics) {
                self.events.push(ScreenEvent::GeometryChanged {
                    screen: screen.id(),
                    geometry: screen.geometry(),
                    available_geometry: screen.available_geometry(),
                });
            }
        }
    }

    fn update_resources(&mut self, index: usize, root: RootId, query: &dyn DescriptorQuery) -> Result<(), TopologyError> {
        let database = query
            .resource_database(root)
            .ok_or(TopologyError::DescriptorUnavailable(Descriptor::Resources(root)))?;
        let (override_dpi, floor) = (self.settings.font_dpi_override, self.settings.min_logical_dpi);
        let desktop = &mut self.desktops[index];
        let before = desktop.logical_dpi(override_dpi, floor);
        desktop.resources = XResources::parse(&database);
        let after = desktop.logical_dpi(override_dpi, floor);
        if before != after {
            crate::slog!(TOPOLOGY, "Desktop {} logical DPI {:?} -> {:?}", index, before, after);
            for screen in &desktop.screens {
                self.events.push(ScreenEvent::LogicalDpiChanged { screen: screen.id(), dpi: after });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Screen lifecycle
    // =========================================================================

    fn allocate_screen_id(&mut self) -> ScreenId {
        let id = ScreenId(self.next_screen_id);
        self.next_screen_id += 1;
        id
    }

    /// Build an output-backed screen with its geometry and refresh rate
    /// established. Not yet attached to the desktop.
    #[allow(clippy::too_many_arguments)]
    fn build_output_screen(
        &mut self,
        index: usize,
        root: RootId,
        output: OutputId,
        info: &OutputInfo,
        crtc_hint: Option<CrtcId>,
        metrics: &DesktopMetrics,
        query: &dyn DescriptorQuery,
    ) -> Screen {
        let id = self.allocate_screen_id();
        let mut screen = Screen::for_output(id, index, output, info, self.settings.default_refresh_rate);
        if screen.crtc().is_none() {
            screen.set_crtc(crtc_hint);
        }
        if let Some(crtc) = screen.crtc().and_then(|crtc| query.crtc_info(crtc)) {
            let rotation = Rotation::from_randr(crtc.rotation).unwrap_or_default();
            screen.update_geometry(crtc.geometry, rotation, metrics);
            if let Some(mode) = crtc.mode {
                if let Err(e) = screen.update_refresh_rate(root, mode, query) {
                    crate::slog!(TOPOLOGY, "No refresh rate for {}: {}", screen.name(), e);
                }
            }
        }
        screen.finish_setup(metrics);
        screen
    }

    fn build_monitor_screen(
        &mut self,
        index: usize,
        root: RootId,
        monitor: &MonitorInfo,
        metrics: &DesktopMetrics,
        query: &dyn DescriptorQuery,
    ) -> Screen {
        let id = self.allocate_screen_id();
        let mut screen = Screen::for_monitor(id, index, monitor, self.settings.default_refresh_rate);
        configure_from_monitor(&mut screen, root, monitor, metrics, query);
        screen.finish_setup(metrics);
        screen
    }

    fn apply_monitor(
        &mut self,
        index: usize,
        id: ScreenId,
        root: RootId,
        monitor: &MonitorInfo,
        metrics: &DesktopMetrics,
        query: &dyn DescriptorQuery,
    ) {
        let Some(screen) = self.desktops[index].screen_mut(id) else {
            return;
        };
        let (changes, refresh) = configure_from_monitor(screen, root, monitor, metrics, query);
        push_changes(&mut self.events, screen, changes);
        if let Some(rate) = refresh {
            self.events.push(ScreenEvent::RefreshRateChanged { screen: id, rate });
        }
    }

    /// New output on a desktop without a placeholder.
    fn create_screen(
        &mut self,
        index: usize,
        root: RootId,
        output: OutputId,
        info: &OutputInfo,
        crtc: CrtcId,
        query: &dyn DescriptorQuery,
    ) -> ScreenId {
        let metrics = self.desktops[index].metrics();
        let mut screen = self.build_output_screen(index, root, output, info, Some(crtc), &metrics, query);
        let primary = self.desktops[index].hosts_primary() && query.primary_output(root) == Some(output);
        screen.set_primary(primary);

        let id = screen.id();
        self.desktops[index].add_screen(screen);
        crate::slog!(TOPOLOGY, "Output {} connected as {} (primary: {})", info.name, id, primary);
        self.events.push(ScreenEvent::ScreenAdded { screen: id, primary });
        id
    }

    /// Re-read an existing screen's CRTC, mode and primary state.
    ///
    /// A missing CRTC keeps the one the screen is attached to; a missing
    /// mode leaves the refresh rate alone.
    #[allow(clippy::too_many_arguments)]
    fn update_screen(
        &mut self,
        index: usize,
        id: ScreenId,
        root: RootId,
        output: OutputId,
        crtc: Option<CrtcId>,
        mode: Option<ModeId>,
        query: &dyn DescriptorQuery,
    ) -> Result<(), TopologyError> {
        let metrics = self.desktops[index].metrics();
        let desktop = &mut self.desktops[index];
        let Some(screen) = desktop.screens.iter_mut().find(|s| s.id() == id) else {
            return Ok(());
        };

        if let Some(crtc) = crtc.or(screen.crtc()) {
            screen.set_crtc(Some(crtc));
            let info = query
                .crtc_info(crtc)
                .ok_or(TopologyError::DescriptorUnavailable(Descriptor::Crtc(crtc)))?;
            let rotation = Rotation::from_randr(info.rotation).unwrap_or(screen.rotation());
            let changes = screen.update_geometry(info.geometry, rotation, &metrics);
            push_changes(&mut self.events, screen, changes);
        }

        let was_primary = screen.is_primary();
        if let Some(mode) = mode {
            let refresh = screen.update_refresh_rate(root, mode, query);
            push_refresh(&mut self.events, id, refresh)?;
        }

        // Only the primary-hosting desktop may hold the primary screen.
        if desktop.hosts_primary() && !was_primary && query.primary_output(root) == Some(output) {
            if let Some(position) = desktop.position(id) {
                desktop.set_primary_screen(position);
                crate::slog!(TOPOLOGY, "{} became primary", id);
                self.events.push(ScreenEvent::PrimaryScreenChanged { screen: id });
            }
        }
        Ok(())
    }

    /// Remove a screen, or turn it into a placeholder when it is the last
    /// one on its desktop.
    fn destroy_screen(&mut self, index: usize, id: ScreenId) {
        let desktop = &mut self.desktops[index];
        if desktop.screens.len() == 1 {
            if let Some(screen) = desktop.screen_mut(id) {
                let name = screen.name().to_string();
                screen.set_output(None);
                crate::slog!(TOPOLOGY, "Transformed {} ({}) into a placeholder", id, name);
            }
            return;
        }

        let Some(removed) = desktop.remove_screen(id) else {
            return;
        };
        if removed.is_primary() {
            desktop.set_primary_screen(0);
            if let Some(promoted) = desktop.screens.first() {
                crate::slog!(TOPOLOGY, "{} promoted to primary", promoted.id());
                self.events.push(ScreenEvent::PrimaryScreenChanged { screen: promoted.id() });
            }
        }
        crate::slog!(TOPOLOGY, "Removed {} ({})", id, removed.name());
        self.events.push(ScreenEvent::ScreenRemoved { screen: id });
    }
}

fn fetch_output(query: &dyn DescriptorQuery, output: OutputId) -> Result<OutputInfo, TopologyError> {
    query
        .output_info(output)
        .ok_or(TopologyError::DescriptorUnavailable(Descriptor::Output(output)))
}

/// Bind `screen` to `monitor` and apply the monitor's geometry, taking
/// rotation and mode from the CRTC of its first output when available.
fn configure_from_monitor(
    screen: &mut Screen,
    root: RootId,
    monitor: &MonitorInfo,
    metrics: &DesktopMetrics,
    query: &dyn DescriptorQuery,
) -> (ScreenChanges, Option<f64>) {
    let crtc = monitor
        .outputs
        .first()
        .and_then(|&output| query.output_info(output))
        .and_then(|info| info.crtc);
    let crtc_info = crtc.and_then(|crtc| query.crtc_info(crtc));
    screen.bind_monitor(Some(monitor), crtc);

    let rotation = crtc_info
        .and_then(|info| Rotation::from_randr(info.rotation))
        .unwrap_or(screen.rotation());
    let changes = screen.update_geometry(monitor.geometry, rotation, metrics);

    let refresh = match crtc_info.and_then(|info| info.mode) {
        Some(mode) => screen.update_refresh_rate(root, mode, query).unwrap_or_else(|e| {
            crate::slog!(TOPOLOGY, "No refresh rate for monitor {}: {}", monitor.name, e);
            None
        }),
        None => None,
    };
    (changes, refresh)
}

fn push_changes(events: &mut Vec<ScreenEvent>, screen: &Screen, changes: ScreenChanges) {
    if changes.geometry {
        events.push(ScreenEvent::GeometryChanged {
            screen: screen.id(),
            geometry: screen.geometry(),
            available_geometry: screen.available_geometry(),
        });
    }
    if changes.orientation {
        events.push(ScreenEvent::OrientationChanged {
            screen: screen.id(),
            orientation: screen.orientation(),
        });
    }
}

fn push_refresh(
    events: &mut Vec<ScreenEvent>,
    screen: ScreenId,
    refresh: Result<Option<f64>, TopologyError>,
) -> Result<(), TopologyError> {
    if let Some(rate) = refresh? {
        events.push(ScreenEvent::RefreshRateChanged { screen, rate });
    }
    Ok(())
}
