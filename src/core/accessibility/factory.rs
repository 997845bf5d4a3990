//! Interface factories keyed by type tag.

use std::collections::HashMap;

use super::interface::{InterfaceRc, ObjectRef, TypeTag};

/// Constructor producing an interface for an object, or `None` to decline.
pub type FactoryFn = dyn Fn(&ObjectRef) -> Option<InterfaceRc>;

/// Handle returned by [`FactoryTable::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactoryId(u64);

struct Factory {
    id: FactoryId,
    create: Box<FactoryFn>,
}

/// Lookup table from type tag to interface constructors.
///
/// Creation walks the object's type chain most derived first; within one
/// tag, factories are tried in installation order. The first one that
/// returns an interface wins.
#[derive(Default)]
pub struct FactoryTable {
    factories: HashMap<TypeTag, Vec<Factory>>,
    next_id: u64,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install<F>(&mut self, type_tag: TypeTag, create: F) -> FactoryId
    where
        F: Fn(&ObjectRef) -> Option<InterfaceRc> + 'static,
    {
        self.next_id += 1;
        let id = FactoryId(self.next_id);
        self.factories.entry(type_tag).or_default().push(Factory {
            id,
            create: Box::new(create),
        });
        crate::slog!(crate::util::logging::A11Y, "Installed factory {:?} for {}", id, type_tag.name());
        id
    }

    /// Remove a factory; returns whether it was installed.
    pub fn remove(&mut self, id: FactoryId) -> bool {
        let mut removed = false;
        self.factories.retain(|_, list| {
            let before = list.len();
            list.retain(|factory| factory.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Build an interface for `object`, walking its type chain.
    pub fn create(&self, object: &ObjectRef) -> Option<InterfaceRc> {
        object.type_tag.ancestors().find_map(|tag| {
            self.factories
                .get(&tag)?
                .iter()
                .find_map(|factory| (factory.create)(object))
        })
    }

    /// Number of installed factories.
    pub fn len(&self) -> usize {
        self.factories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn clear(&mut self) {
        self.factories.clear();
    }
}

impl std::fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryTable")
            .field("tags", &self.factories.keys().collect::<Vec<_>>())
            .field("factories", &self.len())
            .finish()
    }
}
