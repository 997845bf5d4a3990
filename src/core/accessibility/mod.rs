//! Accessibility identity tracking.
//!
//! Assistive technology refers to accessible interfaces through opaque
//! numeric identities. This module hands those identities out, resolves
//! them in both directions, and makes sure none survives the object it
//! describes.

pub mod cache;
pub mod factory;
pub mod identity;
pub mod interface;
pub mod lifecycle;

#[cfg(test)]
mod tests;

pub use cache::{AccessibilityCache, CacheEntry};
pub use factory::{FactoryFn, FactoryId, FactoryTable};
pub use identity::{Identity, IdentityAllocator, IdentityRange};
pub use interface::{AccessibleInterface, InterfaceKey, InterfaceRc, ObjectId, ObjectRef, Role, TypeInfo, TypeTag};
pub use lifecycle::{LifecycleTracker, WatchEntry};
