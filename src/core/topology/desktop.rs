//! Virtual desktop: one root coordinate space and the screens it hosts.

use crate::util::geometry::{Dpi, Rect, Size};

use super::resources::XResources;
use super::screen::{DesktopMetrics, Screen};
use super::types::{CrtcId, OutputId, RootId, Rotation, ScreenId};

/// A root coordinate space hosting one or more screens.
///
/// Screens are kept in order with the primary screen, if any, at index 0.
/// A desktop never has zero screens once the model is initialized.
#[derive(Debug, Clone)]
pub struct VirtualDesktop {
    pub(crate) index: usize,
    pub(crate) root: RootId,
    pub(crate) size: Size,
    pub(crate) size_mm: Size,
    pub(crate) rotation: Rotation,
    pub(crate) screens: Vec<Screen>,
    pub(crate) work_area: Option<Rect>,
    pub(crate) resources: XResources,
    pub(crate) hosts_primary: bool,
}

impl VirtualDesktop {
    pub fn new(index: usize, root: RootId, size: Size, size_mm: Size, hosts_primary: bool) -> Self {
        Self {
            index,
            root,
            size,
            size_mm,
            rotation: Rotation::Normal,
            screens: Vec::new(),
            work_area: None,
            resources: XResources::default(),
            hosts_primary,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn size_mm(&self) -> Size {
        self.size_mm
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn resources(&self) -> &XResources {
        &self.resources
    }

    /// Whether screens of this desktop may become the global primary.
    pub fn hosts_primary(&self) -> bool {
        self.hosts_primary
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Published work area. `None` leaves screen geometry unclipped.
    pub fn work_area(&self) -> Option<Rect> {
        self.work_area
    }

    /// Physical DPI derived from the root size in pixels and millimetres.
    pub fn dpi(&self) -> Dpi {
        Dpi::from_physical(self.size, self.size_mm)
    }

    /// Logical DPI: the override, else the resource database value, else the
    /// physical DPI raised to at least `floor` on each axis.
    pub fn logical_dpi(&self, font_dpi_override: Option<u32>, floor: f64) -> Dpi {
        if let Some(dpi) = font_dpi_override.or(self.resources.forced_dpi) {
            return Dpi::uniform(dpi as f64);
        }
        self.dpi().clamped_to(floor)
    }

    pub fn metrics(&self) -> DesktopMetrics {
        DesktopMetrics {
            size: self.size,
            size_mm: self.size_mm,
            work_area: self.work_area,
            dpi: self.dpi(),
        }
    }

    // =========================================================================
    // Screen lookup
    // =========================================================================

    pub fn position(&self, id: ScreenId) -> Option<usize> {
        self.screens.iter().position(|s| s.id() == id)
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id() == id)
    }

    pub fn screen_for_output(&self, output: OutputId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.output() == Some(output))
    }

    pub fn screen_for_crtc(&self, crtc: CrtcId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.crtc() == Some(crtc))
    }

    pub fn screen_for_monitor(&self, name: &str) -> Option<&Screen> {
        self.screens
            .iter()
            .find(|s| s.monitor().is_some_and(|m| m.name == name))
    }

    pub fn placeholder(&self) -> Option<&Screen> {
        self.screens.iter().find(|s| s.is_placeholder())
    }

    pub fn primary_screen(&self) -> Option<&Screen> {
        self.screens.first().filter(|s| s.is_primary())
    }

    pub(crate) fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id() == id)
    }

    // =========================================================================
    // Screen list maintenance
    // =========================================================================

    /// Append a screen; a primary screen goes to the front and takes the flag
    /// from whichever screen held it.
    pub(crate) fn add_screen(&mut self, screen: Screen) {
        if screen.is_primary() {
            for other in &mut self.screens {
                other.set_primary(false);
            }
            self.screens.insert(0, screen);
        } else {
            self.screens.push(screen);
        }
    }

    pub(crate) fn remove_screen(&mut self, id: ScreenId) -> Option<Screen> {
        let index = self.position(id)?;
        Some(self.screens.remove(index))
    }

    /// Make the screen at `index` primary: clear the old flag first, then
    /// swap the new primary into index 0.
    pub(crate) fn set_primary_screen(&mut self, index: usize) {
        if index >= self.screens.len() {
            return;
        }
        for screen in &mut self.screens {
            screen.set_primary(false);
        }
        self.screens[index].set_primary(true);
        self.screens.swap(0, index);
    }

    /// Replace the screen order; screens not listed in `order` are dropped.
    pub(crate) fn reorder(&mut self, order: &[ScreenId]) {
        let mut screens = std::mem::take(&mut self.screens);
        for id in order {
            if let Some(index) = screens.iter().position(|s| s.id() == *id) {
                self.screens.push(screens.swap_remove(index));
            }
        }
    }

    /// Apply a root rotation/size change. Returns `false` when the rotation
    /// is unchanged, in which case nothing is updated: size changes without
    /// rotation arrive through CRTC and output notifications instead.
    pub(crate) fn handle_screen_change(&mut self, rotation: Rotation, size: Size, size_mm: Size) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        if rotation.swaps_axes() {
            self.size = size.transposed();
            self.size_mm = size_mm.transposed();
        } else {
            self.size = size;
            self.size_mm = size_mm;
        }
        true
    }

    /// Store a new work area. Returns whether it differs from the old one.
    pub(crate) fn set_work_area(&mut self, work_area: Option<Rect>) -> bool {
        let work_area = work_area.filter(|area| !area.is_empty());
        if work_area == self.work_area {
            return false;
        }
        self.work_area = work_area;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topology::query::OutputInfo;
    use crate::core::topology::types::Connection;

    fn desktop() -> VirtualDesktop {
        VirtualDesktop::new(0, RootId(1), Size::new(3840, 1080), Size::new(1016, 286), true)
    }

    fn output_screen(id: u32, output: u32) -> Screen {
        let info = OutputInfo {
            name: format!("DP-{}", output),
            connection: Connection::Connected,
            crtc: Some(CrtcId(output + 100)),
            size_mm: Size::new(520, 290),
        };
        Screen::for_output(ScreenId(id), 0, OutputId(output), &info, 60.0)
    }

    #[test]
    fn test_primary_goes_first() {
        let mut desktop = desktop();
        desktop.add_screen(output_screen(1, 1));
        let mut primary = output_screen(2, 2);
        primary.set_primary(true);
        desktop.add_screen(primary);

        assert_eq!(desktop.screens()[0].id(), ScreenId(2));
        assert_eq!(desktop.primary_screen().map(|s| s.id()), Some(ScreenId(2)));

        desktop.set_primary_screen(1);
        assert_eq!(desktop.screens()[0].id(), ScreenId(1));
        assert_eq!(desktop.screens().iter().filter(|s| s.is_primary()).count(), 1);
    }

    #[test]
    fn test_logical_dpi_policy() {
        let mut desktop = desktop();
        // 3840px over 1016mm is exactly 96 DPI
        let dpi = desktop.logical_dpi(None, 96.0);
        assert!((dpi.x - 96.0).abs() < 0.01);

        // A TV claiming 2 metres across must not drop below 96
        desktop.size_mm = Size::new(2000, 1100);
        assert_eq!(desktop.logical_dpi(None, 96.0), Dpi::uniform(96.0));

        desktop.resources.forced_dpi = Some(120);
        assert_eq!(desktop.logical_dpi(None, 96.0), Dpi::uniform(120.0));
        assert_eq!(desktop.logical_dpi(Some(144), 96.0), Dpi::uniform(144.0));
    }

    #[test]
    fn test_empty_work_area_is_unset() {
        let mut desktop = desktop();
        assert_eq!(desktop.work_area(), None);
        assert!(desktop.set_work_area(Some(Rect::new(0, 30, 3840, 1050))));
        assert!(!desktop.set_work_area(Some(Rect::new(0, 30, 3840, 1050))));
        assert!(desktop.set_work_area(Some(Rect::zero())));
        assert_eq!(desktop.work_area(), None);

        // Without a work area, geometry outside the root rect is not clipped
        let outside = Rect::new(0, 1080, 1920, 1080);
        assert_eq!(desktop.metrics().available_geometry(outside), outside);
    }

    #[test]
    fn test_root_rotation_swaps_size() {
        let mut desktop = desktop();
        assert!(!desktop.handle_screen_change(Rotation::Normal, Size::new(1, 1), Size::new(1, 1)));
        assert!(desktop.handle_screen_change(Rotation::Left, Size::new(3840, 1080), Size::new(1016, 286)));
        assert_eq!(desktop.size(), Size::new(1080, 3840));
        assert_eq!(desktop.size_mm(), Size::new(286, 1016));
    }
}
