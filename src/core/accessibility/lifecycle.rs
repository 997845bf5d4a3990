//! Owner destruction tracking.
//!
//! An owner may hold more than one identity at a time: while an object is
//! being constructed its effective type can still be a base type, so a
//! factory may produce a base-type interface first and a derived-type one
//! later. Each owner therefore keeps a small vector of watch entries, and a
//! destruction notification hands back all of them.

use std::collections::HashMap;

use super::identity::Identity;
use super::interface::{ObjectId, TypeTag};

/// One identity watched on behalf of an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchEntry {
    pub identity: Identity,
    pub type_tag: TypeTag,
}

/// Per-owner watch lists.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    watched: HashMap<ObjectId, Vec<WatchEntry>>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `owner` for `identity`.
    pub fn watch(&mut self, owner: ObjectId, identity: Identity, type_tag: TypeTag) {
        self.watched
            .entry(owner)
            .or_default()
            .push(WatchEntry { identity, type_tag });
    }

    /// Stop watching a single identity; the owner's list is dropped once empty.
    pub fn forget(&mut self, owner: ObjectId, identity: Identity) {
        if let Some(entries) = self.watched.get_mut(&owner) {
            entries.retain(|entry| entry.identity != identity);
            if entries.is_empty() {
                self.watched.remove(&owner);
            }
        }
    }

    /// Identity registered for `owner` under exactly `type_tag`.
    pub fn identity_for(&self, owner: ObjectId, type_tag: TypeTag) -> Option<Identity> {
        self.watched
            .get(&owner)?
            .iter()
            .find(|entry| entry.type_tag == type_tag)
            .map(|entry| entry.identity)
    }

    /// All entries for `owner`, in registration order.
    pub fn entries(&self, owner: ObjectId) -> &[WatchEntry] {
        self.watched.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Handle an owner's destruction notification.
    ///
    /// Returns every identity that was watched for it; owners that were never
    /// watched yield an empty list.
    pub fn object_destroyed(&mut self, owner: ObjectId) -> Vec<Identity> {
        self.watched
            .remove(&owner)
            .map(|entries| entries.into_iter().map(|entry| entry.identity).collect())
            .unwrap_or_default()
    }

    pub fn is_watched(&self, owner: ObjectId) -> bool {
        self.watched.contains_key(&owner)
    }

    /// Number of watched owners.
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    pub fn clear(&mut self) {
        self.watched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::interface::TypeInfo;

    static BASE: TypeInfo = TypeInfo::new("Base", None);
    static DERIVED: TypeInfo = TypeInfo::new("Derived", Some(&BASE));

    fn id(raw: u32) -> Identity {
        Identity::new(raw).unwrap()
    }

    #[test]
    fn test_destroy_returns_all_entries() {
        let mut tracker = LifecycleTracker::new();
        let owner = ObjectId(7);
        tracker.watch(owner, id(100), TypeTag::of(&BASE));
        tracker.watch(owner, id(101), TypeTag::of(&DERIVED));

        assert_eq!(tracker.identity_for(owner, TypeTag::of(&DERIVED)), Some(id(101)));
        assert_eq!(tracker.object_destroyed(owner), vec![id(100), id(101)]);
        assert!(!tracker.is_watched(owner));
        assert!(tracker.object_destroyed(owner).is_empty());
    }

    #[test]
    fn test_forget_single_entry() {
        let mut tracker = LifecycleTracker::new();
        let owner = ObjectId(1);
        tracker.watch(owner, id(5), TypeTag::of(&BASE));
        tracker.watch(owner, id(6), TypeTag::of(&DERIVED));

        tracker.forget(owner, id(5));
        assert_eq!(tracker.entries(owner).len(), 1);
        tracker.forget(owner, id(6));
        assert!(tracker.is_empty());
    }
}
