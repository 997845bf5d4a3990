//! Core error types

use thiserror::Error;

use crate::core::accessibility::{Identity, ObjectId};
use crate::core::topology::{CrtcId, ModeId, OutputId, RootId};

/// Accessibility cache errors.
///
/// Everything except `IdentitySpaceExhausted` is a caller contract violation;
/// the cache is left untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessibilityError {
    #[error("Accessible interface is already registered as {0}")]
    DuplicateInterface(Identity),

    #[error("Object {object} already has an interface of type {type_name} ({existing})")]
    DuplicateObject {
        object: ObjectId,
        type_name: &'static str,
        existing: Identity,
    },

    #[error("Owner {given} does not match the interface's object {actual:?}")]
    OwnerMismatch {
        given: ObjectId,
        actual: Option<ObjectId>,
    },

    #[error("Identity space exhausted ({live} live identities)")]
    IdentitySpaceExhausted { live: usize },
}

/// Topology reconciliation errors.
///
/// Descriptor failures are transient: the event that triggered the query is
/// dropped and the model waits for the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("No virtual desktops were enumerated")]
    NoDesktops,

    #[error("Primary desktop index {index} is out of range ({count} desktops)")]
    InvalidPrimaryDesktop { index: usize, count: usize },

    #[error("Descriptor unavailable: {0}")]
    DescriptorUnavailable(Descriptor),
}

/// A descriptor the topology model failed to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Output(OutputId),
    Crtc(CrtcId),
    Mode(ModeId),
    WorkArea(RootId),
    Resources(RootId),
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Descriptor::Output(id) => write!(f, "output {}", id.0),
            Descriptor::Crtc(id) => write!(f, "crtc {}", id.0),
            Descriptor::Mode(id) => write!(f, "mode {}", id.0),
            Descriptor::WorkArea(root) => write!(f, "work area of root {}", root.0),
            Descriptor::Resources(root) => write!(f, "resource database of root {}", root.0),
        }
    }
}

/// Cross-thread bridge errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge called from the event thread")]
    Reentrant,

    #[error("Another bridge request is in flight")]
    Busy,

    #[error("Event loop is suspended")]
    Suspended,

    #[error("Event loop did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Request was dropped before it ran")]
    Abandoned,
}

/// Core platform errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Accessibility error: {0}")]
    Accessibility(#[from] AccessibilityError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
