//! Accessible objects, their type tags and the interface trait.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Static description of an object type and its parent type.
///
/// Types form a single-inheritance chain; factories are looked up by walking
/// it from the most derived entry towards the root.
#[derive(Debug)]
pub struct TypeInfo {
    pub name: &'static str,
    pub parent: Option<&'static TypeInfo>,
}

impl TypeInfo {
    pub const fn new(name: &'static str, parent: Option<&'static TypeInfo>) -> Self {
        Self { name, parent }
    }
}

/// Stable discriminator for an object's effective type.
///
/// Two tags are equal only when they point at the same `TypeInfo` static.
#[derive(Clone, Copy)]
pub struct TypeTag(&'static TypeInfo);

impl TypeTag {
    pub const fn of(info: &'static TypeInfo) -> Self {
        Self(info)
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn parent(&self) -> Option<TypeTag> {
        self.0.parent.map(TypeTag)
    }

    /// This tag followed by each ancestor, most derived first.
    pub fn ancestors(&self) -> impl Iterator<Item = TypeTag> {
        std::iter::successors(Some(*self), |tag| tag.parent())
    }

    /// Whether `self` is `other` or derives from it.
    pub fn inherits(&self, other: TypeTag) -> bool {
        self.ancestors().any(|tag| tag == other)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0 as *const TypeInfo).hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.0.name)
    }
}

/// Handle of an externally owned UI object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// An object together with its effective type at the time of the snapshot.
///
/// The tag may change while the object is being constructed, so two
/// snapshots of the same object can carry different tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub type_tag: TypeTag,
}

impl ObjectRef {
    pub fn new(id: ObjectId, type_tag: TypeTag) -> Self {
        Self { id, type_tag }
    }
}

/// Accessible role reported to assistive technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    NoRole,
    Application,
    Window,
    Client,
    Pane,
    PushButton,
    CheckBox,
    ComboBox,
    StaticText,
    EditableText,
    List,
    ListItem,
}

/// Minimal accessible interface surface tracked by the cache.
pub trait AccessibleInterface {
    /// The object this interface describes, or `None` for detached interfaces.
    fn object(&self) -> Option<ObjectRef>;

    /// Interfaces may outlive the state they describe; invalid ones are not
    /// handed out from the cache.
    fn is_valid(&self) -> bool {
        true
    }

    fn role(&self) -> Role;

    fn name(&self) -> String {
        String::new()
    }
}

/// Shared handle to a cached interface.
pub type InterfaceRc = Rc<dyn AccessibleInterface>;

/// Address-based key identifying one interface allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceKey(usize);

impl InterfaceKey {
    pub fn of(iface: &InterfaceRc) -> Self {
        Self(Rc::as_ptr(iface) as *const () as usize)
    }
}
