//! Accessibility interface cache.
//!
//! Maps opaque identities to interfaces and back, and purges entries when
//! their owning object is destroyed. Owned by the event thread.

use std::collections::HashMap;

use crate::core::errors::AccessibilityError;
use crate::util::logging::A11Y;

use super::factory::FactoryTable;
use super::identity::{Identity, IdentityAllocator, IdentityRange};
use super::interface::{InterfaceKey, InterfaceRc, ObjectId, ObjectRef, TypeTag};
use super::lifecycle::LifecycleTracker;

/// A registered interface.
#[derive(Clone)]
pub struct CacheEntry {
    pub interface: InterfaceRc,
    pub owner: Option<ObjectId>,
    pub type_tag: Option<TypeTag>,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("interface", &InterfaceKey::of(&self.interface))
            .field("owner", &self.owner)
            .field("type_tag", &self.type_tag)
            .finish()
    }
}

/// Identity <-> interface registry with owner lifecycle tracking.
#[derive(Debug)]
pub struct AccessibilityCache {
    allocator: IdentityAllocator,
    by_identity: HashMap<Identity, CacheEntry>,
    by_interface: HashMap<InterfaceKey, Identity>,
    lifecycle: LifecycleTracker,
}

impl AccessibilityCache {
    pub fn new(range: IdentityRange) -> Self {
        Self {
            allocator: IdentityAllocator::new(range),
            by_identity: HashMap::new(),
            by_interface: HashMap::new(),
            lifecycle: LifecycleTracker::new(),
        }
    }

    // =========================================================================
    // Allocation & registration
    // =========================================================================

    /// Reserve the next unused identity without registering anything.
    pub fn acquire_identity(&mut self) -> Result<Identity, AccessibilityError> {
        let live = &self.by_identity;
        self.allocator.acquire(live.len(), |id| live.contains_key(&id))
    }

    /// Register `interface` for `owner`.
    ///
    /// `owner` must be the interface's own object. With `None` the owner is
    /// taken from the interface, so only interfaces without an object stay
    /// detached. The interface must not be registered yet, and the owner
    /// must not already have an interface under the same type tag.
    pub fn register_object(
        &mut self,
        owner: Option<ObjectRef>,
        interface: InterfaceRc,
    ) -> Result<Identity, AccessibilityError> {
        let owner = owner.or_else(|| interface.object());
        let key = InterfaceKey::of(&interface);
        if let Some(&existing) = self.by_interface.get(&key) {
            tracing::error!("[{}] Accessible interface inserted into cache twice ({})", A11Y, existing);
            return Err(AccessibilityError::DuplicateInterface(existing));
        }

        if let Some(owner) = owner {
            let actual = interface.object().map(|object| object.id);
            if actual != Some(owner.id) {
                tracing::error!("[{}] Interface object {:?} does not match owner {}", A11Y, actual, owner.id);
                return Err(AccessibilityError::OwnerMismatch { given: owner.id, actual });
            }
            if let Some(existing) = self.lifecycle.identity_for(owner.id, owner.type_tag) {
                tracing::error!(
                    "[{}] {} already has a {} interface ({})",
                    A11Y, owner.id, owner.type_tag.name(), existing
                );
                return Err(AccessibilityError::DuplicateObject {
                    object: owner.id,
                    type_name: owner.type_tag.name(),
                    existing,
                });
            }
        }

        let identity = self.acquire_identity()?;
        if let Some(owner) = owner {
            self.lifecycle.watch(owner.id, identity, owner.type_tag);
        }
        self.by_interface.insert(key, identity);
        self.by_identity.insert(
            identity,
            CacheEntry {
                interface,
                owner: owner.map(|o| o.id),
                type_tag: owner.map(|o| o.type_tag),
            },
        );
        crate::slog!(A11Y, "Registered {} for {:?}", identity, owner);
        Ok(identity)
    }

    /// Identity of `interface`, registering it first if needed.
    pub fn unique_id(&mut self, interface: &InterfaceRc) -> Result<Identity, AccessibilityError> {
        if let Some(identity) = self.identity_for_interface(interface) {
            return Ok(identity);
        }
        self.register_object(None, interface.clone())
    }

    /// Cached interface for `object`, or a fresh one from `factories`.
    ///
    /// Cached interfaces that report themselves invalid are not returned.
    pub fn query_interface(&mut self, object: &ObjectRef, factories: &FactoryTable) -> Option<InterfaceRc> {
        if let Some(identity) = self.identity_for_object(object) {
            let interface = self.interface(identity)?;
            return interface.is_valid().then_some(interface);
        }

        let interface = factories.create(object)?;
        match self.register_object(Some(*object), interface.clone()) {
            Ok(_) => Some(interface),
            Err(e) => {
                tracing::warn!("[{}] Dropping factory interface for {}: {}", A11Y, object.id, e);
                None
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn interface(&self, identity: Identity) -> Option<InterfaceRc> {
        self.by_identity.get(&identity).map(|entry| entry.interface.clone())
    }

    pub fn identity_for_interface(&self, interface: &InterfaceRc) -> Option<Identity> {
        self.by_interface.get(&InterfaceKey::of(interface)).copied()
    }

    /// Identity registered for `object` under its current type tag.
    pub fn identity_for_object(&self, object: &ObjectRef) -> Option<Identity> {
        self.lifecycle.identity_for(object.id, object.type_tag)
    }

    pub fn contains_object(&self, object: &ObjectRef) -> bool {
        self.identity_for_object(object).is_some()
    }

    pub fn entry(&self, identity: Identity) -> Option<&CacheEntry> {
        self.by_identity.get(&identity)
    }

    /// All live identities, in ascending order.
    pub fn identities(&self) -> Vec<Identity> {
        let mut ids: Vec<_> = self.by_identity.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    // =========================================================================
    // Release
    // =========================================================================

    /// Release `identity` and drop the cache's handle on its interface.
    ///
    /// Unknown identities are ignored. When `owner_hint` is given it must match
    /// the entry's owner; a mismatch is logged and nothing is released.
    pub fn release(&mut self, identity: Identity, owner_hint: Option<ObjectId>) -> bool {
        let Some(entry) = self.by_identity.get(&identity) else {
            return false;
        };
        if let Some(hint) = owner_hint {
            if entry.owner != Some(hint) {
                tracing::error!(
                    "[{}] Release of {} with owner hint {} but entry belongs to {:?}",
                    A11Y, identity, hint, entry.owner
                );
                return false;
            }
        }

        if let Some(entry) = self.remove_entry(identity) {
            if let Some(owner) = entry.owner {
                self.lifecycle.forget(owner, identity);
            }
        }
        true
    }

    /// Destruction notification for `owner`: releases every identity
    /// registered against it. Returns how many were released.
    pub fn object_destroyed(&mut self, owner: ObjectId) -> usize {
        let identities = self.lifecycle.object_destroyed(owner);
        let released = identities
            .into_iter()
            .filter(|&identity| self.remove_entry(identity).is_some())
            .count();
        if released > 0 {
            crate::slog!(A11Y, "{} destroyed, released {} interface(s)", owner, released);
        }
        released
    }

    /// Drop every entry. Used at shutdown.
    pub fn clear(&mut self) {
        let count = self.by_identity.len();
        self.by_identity.clear();
        self.by_interface.clear();
        self.lifecycle.clear();
        crate::slog!(A11Y, "Cleared accessibility cache ({} entries)", count);
    }

    fn remove_entry(&mut self, identity: Identity) -> Option<CacheEntry> {
        let entry = self.by_identity.remove(&identity)?;
        self.by_interface.remove(&InterfaceKey::of(&entry.interface));
        crate::slog!(A11Y, "Released {}", identity);
        Some(entry)
    }
}

impl Default for AccessibilityCache {
    fn default() -> Self {
        Self::new(IdentityRange::default())
    }
}
