//! Platform API Trait
//!
//! A platform adapter owns the event thread: it creates the [`Context`],
//! feeds it display-server events and accessibility notifications, and pumps
//! the bridge so other threads can reach the context.

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::config::PlatformConfig;
use crate::core::accessibility::{AccessibleInterface, Identity, ObjectId, ObjectRef, Role, TypeInfo, TypeTag};
use crate::core::topology::{
    CrtcId, ModeId, NotificationSink, Orientation, OutputId, ProtocolEvent, RootId, Rotation, ScreenId,
};
use crate::core::{Context, EventLoop};
use crate::util::geometry::{Dpi, Rect, Size};
use crate::util::logging::{PLATFORM, SCREEN};

use super::headless::HeadlessDisplay;

/// Platform adapter interface.
///
/// ## Lifecycle
/// - `initialize()` → build the context and enumerate screens
/// - `run()` → serve display and bridge events until done
/// - `shutdown()` → tear the context down; must run on the event thread
pub trait Platform {
    /// Initialize the platform adapter.
    fn initialize(&mut self) -> Result<()>;

    /// Run the platform event loop.
    fn run(&mut self) -> Result<()>;

    /// Release everything the context holds.
    fn shutdown(&mut self);
}

/// Notification sink that only logs.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl NotificationSink for LoggingSink {
    fn screen_added(&mut self, screen: ScreenId, primary: bool) {
        tracing::info!("[{}] {} added (primary: {})", SCREEN, screen, primary);
    }

    fn screen_removed(&mut self, screen: ScreenId) {
        tracing::info!("[{}] {} removed", SCREEN, screen);
    }

    fn geometry_changed(&mut self, screen: ScreenId, geometry: Rect, available_geometry: Rect) {
        tracing::info!("[{}] {} geometry {:?}, available {:?}", SCREEN, screen, geometry, available_geometry);
    }

    fn orientation_changed(&mut self, screen: ScreenId, orientation: Orientation) {
        tracing::info!("[{}] {} orientation {:?}", SCREEN, screen, orientation);
    }

    fn refresh_rate_changed(&mut self, screen: ScreenId, rate: f64) {
        tracing::info!("[{}] {} refresh rate {:.2} Hz", SCREEN, screen, rate);
    }

    fn primary_screen_changed(&mut self, screen: ScreenId) {
        tracing::info!("[{}] {} is now primary", SCREEN, screen);
    }

    fn logical_dpi_changed(&mut self, screen: ScreenId, dpi: Dpi) {
        tracing::info!("[{}] {} logical DPI {:.1}x{:.1}", SCREEN, screen, dpi.x, dpi.y);
    }
}

// ============================================================================
// Headless platform
// ============================================================================

static OBJECT: TypeInfo = TypeInfo::new("Object", None);
static WINDOW: TypeInfo = TypeInfo::new("Window", Some(&OBJECT));
static BUTTON: TypeInfo = TypeInfo::new("PushButton", Some(&WINDOW));

const ROOT: RootId = RootId(0x1e0);
const MODE_60: ModeId = ModeId(0x40);
const MODE_75: ModeId = ModeId(0x41);

struct HeadlessWidget {
    object: ObjectRef,
    role: Role,
}

impl AccessibleInterface for HeadlessWidget {
    fn object(&self) -> Option<ObjectRef> {
        Some(self.object)
    }

    fn role(&self) -> Role {
        self.role
    }

    fn name(&self) -> String {
        format!("{} {}", self.object.type_tag.name(), self.object.id.0)
    }
}

/// Platform running against an in-memory display with a scripted session:
/// hotplug, rotation, primary loss, a work area, resource changes and a few
/// accessible widgets queried from a bridge thread.
pub struct HeadlessPlatform {
    config: PlatformConfig,
    display: HeadlessDisplay,
    context: Option<Context>,
    sink: LoggingSink,
}

impl HeadlessPlatform {
    pub fn new(config: PlatformConfig) -> Self {
        let mut display = HeadlessDisplay::new();
        display
            .add_root(ROOT, Size::new(3840, 1080), Size::new(1016, 286))
            .add_mode(ROOT, MODE_60, 1920, 1080, 60)
            .add_mode(ROOT, MODE_75, 1920, 1080, 75)
            .add_output(ROOT, OutputId(0x42), "DP-1", CrtcId(0x3f), MODE_60, Rect::new(0, 0, 1920, 1080), Size::new(520, 290))
            .add_output(ROOT, OutputId(0x43), "HDMI-1", CrtcId(0x40), MODE_60, Rect::new(1920, 0, 1920, 1080), Size::new(480, 270))
            .set_primary(ROOT, Some(OutputId(0x42)));
        Self {
            config,
            display,
            context: None,
            sink: LoggingSink,
        }
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    fn context_mut(&mut self) -> Result<&mut Context> {
        self.context.as_mut().context("platform not initialized")
    }

    /// Feed one display change to the context and deliver what it produced.
    fn apply(&mut self, event: ProtocolEvent) -> Result<()> {
        let Self { display, context, sink, .. } = self;
        let context = context.as_mut().context("platform not initialized")?;
        // Descriptor failures are transient; keep going.
        if let Err(e) = context.handle_event(event, &*display) {
            tracing::warn!("[{}] Event dropped: {}", PLATFORM, e);
        }
        context.dispatch_screen_events(sink);
        Ok(())
    }

    fn run_topology_script(&mut self) -> Result<()> {
        let event = self.display.connect(
            ROOT,
            OutputId(0x44),
            "DP-2",
            CrtcId(0x41),
            MODE_75,
            Rect::new(0, 1080, 1920, 1080),
            Size::new(600, 340),
        );
        self.apply(event)?;

        let event = self
            .display
            .configure_crtc(ROOT, CrtcId(0x40), Rect::new(1920, 0, 1080, 1920), Rotation::Left, MODE_60);
        self.apply(event)?;

        let event = self.display.publish_work_area(ROOT, Some(Rect::new(0, 28, 3840, 1052)));
        self.apply(event)?;

        let event = self.display.publish_resources(ROOT, "Xft.dpi:\t120\nXft.hintstyle:\thintslight\n");
        self.apply(event)?;

        let event = self.display.disconnect(ROOT, OutputId(0x42));
        self.apply(event)
    }

    fn run_accessibility_script(&mut self) -> Result<()> {
        let timeout = self.config.bridge_timeout;
        let context = self.context_mut()?;

        context.factories_mut().install(TypeTag::of(&WINDOW), |object| {
            Some(Rc::new(HeadlessWidget { object: *object, role: Role::Window }) as Rc<dyn AccessibleInterface>)
        });
        context.factories_mut().install(TypeTag::of(&BUTTON), |object| {
            Some(Rc::new(HeadlessWidget { object: *object, role: Role::PushButton }) as Rc<dyn AccessibleInterface>)
        });

        let window = ObjectRef::new(ObjectId(1), TypeTag::of(&WINDOW));
        let button = ObjectRef::new(ObjectId(2), TypeTag::of(&BUTTON));
        let window_id = context
            .query_interface(&window)
            .map(|iface| context.unique_id(&iface))
            .transpose()?
            .context("no interface for window")?;
        context
            .query_interface(&button)
            .context("no interface for button")?;
        tracing::info!("[{}] {} accessible interface(s) cached", PLATFORM, context.accessibility().len());

        // An assistive technology client resolving an identity from its own thread
        let event_loop = EventLoop::new(timeout);
        let handle = event_loop.handle();
        let raw = window_id.get();
        let client = thread::spawn(move || {
            handle.call(move |context| {
                Identity::new(raw)
                    .and_then(|identity| context.interface(identity))
                    .map(|iface| iface.name())
            })
        });
        let context = self.context_mut()?;
        while !client.is_finished() {
            event_loop.dispatch_timeout(context, Duration::from_millis(10));
        }
        let answer = client
            .join()
            .map_err(|_| anyhow::anyhow!("bridge client panicked"))??;
        tracing::info!("[{}] Bridge client resolved {} to {:?}", PLATFORM, window_id, answer);

        let released = context.object_destroyed(ObjectId(2));
        tracing::info!("[{}] Button destroyed, {} identity released", PLATFORM, released);
        Ok(())
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl Platform for HeadlessPlatform {
    fn initialize(&mut self) -> Result<()> {
        let mut context = Context::new(self.config.clone());
        context
            .start_topology(self.display.descriptors(), &self.display)
            .context("failed to enumerate screens")?;
        context.dispatch_screen_events(&mut self.sink);
        self.context = Some(context);
        tracing::info!("[{}] HeadlessPlatform initialized", PLATFORM);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.context_mut()?;
        tracing::info!("[{}] HeadlessPlatform running scripted session", PLATFORM);
        self.run_topology_script()?;
        self.run_accessibility_script()?;
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.shutdown();
        }
        tracing::info!("[{}] HeadlessPlatform shut down", PLATFORM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_session() {
        let mut platform = HeadlessPlatform::default();
        assert!(platform.run().is_err(), "run before initialize must fail");

        platform.initialize().unwrap();
        platform.run().unwrap();

        let context = platform.context().unwrap();
        let topology = context.topology().unwrap();
        // DP-1 was unplugged, HDMI-1 took over as primary
        assert_eq!(topology.primary_screen().map(|s| s.name()), Some("HDMI-1"));
        assert_eq!(topology.screen_count(), 2);
        // The window survives, the button was released
        assert_eq!(context.accessibility().len(), 1);

        platform.shutdown();
        assert!(platform.context().is_none());
    }
}
