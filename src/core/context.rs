//! Platform context.
//!
//! Owns the accessibility cache, the interface factories and the screen
//! topology for one application. Created at startup on the event thread,
//! passed to whatever needs it, and torn down with [`Context::shutdown`].

use crate::config::PlatformConfig;
use crate::core::accessibility::{AccessibilityCache, FactoryTable, Identity, InterfaceRc, ObjectId, ObjectRef};
use crate::core::errors::{AccessibilityError, Result};
use crate::core::topology::{
    DescriptorQuery, DesktopDescriptor, NotificationSink, ProtocolEvent, ScreenEvent, TopologyModel,
    TopologySettings,
};
use crate::util::logging::CORE;

pub struct Context {
    config: PlatformConfig,
    accessibility: AccessibilityCache,
    factories: FactoryTable,
    topology: Option<TopologyModel>,
}

impl Context {
    pub fn new(config: PlatformConfig) -> Self {
        tracing::info!(
            "[{}] Creating platform context (identities {:#x}..{:#x})",
            CORE,
            config.identity_range.first(),
            config.identity_range.end()
        );
        Self {
            accessibility: AccessibilityCache::new(config.identity_range),
            factories: FactoryTable::new(),
            topology: None,
            config,
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    // =========================================================================
    // Accessibility
    // =========================================================================

    pub fn accessibility(&self) -> &AccessibilityCache {
        &self.accessibility
    }

    pub fn accessibility_mut(&mut self) -> &mut AccessibilityCache {
        &mut self.accessibility
    }

    pub fn factories(&self) -> &FactoryTable {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut FactoryTable {
        &mut self.factories
    }

    /// Interface for `object`, created through the installed factories on
    /// first use.
    pub fn query_interface(&mut self, object: &ObjectRef) -> Option<InterfaceRc> {
        self.accessibility.query_interface(object, &self.factories)
    }

    pub fn register_object(
        &mut self,
        owner: Option<ObjectRef>,
        interface: InterfaceRc,
    ) -> std::result::Result<Identity, AccessibilityError> {
        self.accessibility.register_object(owner, interface)
    }

    pub fn unique_id(&mut self, interface: &InterfaceRc) -> std::result::Result<Identity, AccessibilityError> {
        self.accessibility.unique_id(interface)
    }

    pub fn interface(&self, identity: Identity) -> Option<InterfaceRc> {
        self.accessibility.interface(identity)
    }

    /// Destruction notification from the object system.
    pub fn object_destroyed(&mut self, owner: ObjectId) -> usize {
        self.accessibility.object_destroyed(owner)
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Enumerate screens. Replaces any previous topology.
    pub fn start_topology(&mut self, descriptors: Vec<DesktopDescriptor>, query: &dyn DescriptorQuery) -> Result<()> {
        let settings = TopologySettings::from(&self.config);
        self.topology = Some(TopologyModel::initialize(settings, descriptors, query)?);
        Ok(())
    }

    pub fn topology(&self) -> Option<&TopologyModel> {
        self.topology.as_ref()
    }

    /// Feed one protocol event to the topology. Ignored before
    /// [`Context::start_topology`].
    pub fn handle_event(&mut self, event: ProtocolEvent, query: &dyn DescriptorQuery) -> Result<()> {
        let Some(topology) = self.topology.as_mut() else {
            crate::slog!(CORE, "Dropping {:?}: topology not started", event);
            return Ok(());
        };
        topology.handle_event(event, query)?;
        Ok(())
    }

    pub fn take_screen_events(&mut self) -> Vec<ScreenEvent> {
        self.topology.as_mut().map(TopologyModel::take_events).unwrap_or_default()
    }

    pub fn dispatch_screen_events(&mut self, sink: &mut dyn NotificationSink) {
        if let Some(topology) = self.topology.as_mut() {
            topology.dispatch_events(sink);
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release every identity, uninstall factories and drop the topology.
    pub fn shutdown(&mut self) {
        tracing::info!(
            "[{}] Shutting down: {} identities, {} factories",
            CORE,
            self.accessibility.len(),
            self.factories.len()
        );
        self.accessibility.clear();
        self.factories.clear();
        self.topology = None;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("identities", &self.accessibility.len())
            .field("factories", &self.factories.len())
            .field("screens", &self.topology.as_ref().map(TopologyModel::screen_count))
            .finish()
    }
}
