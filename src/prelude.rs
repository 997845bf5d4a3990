//! Common imports and types used throughout Skylight.

pub use crate::config::PlatformConfig;
pub use crate::core::accessibility::{AccessibleInterface, Identity, InterfaceRc, ObjectId, ObjectRef, TypeInfo, TypeTag};
pub use crate::core::topology::{DescriptorQuery, NotificationSink, ProtocolEvent, ScreenEvent, ScreenId};
pub use crate::core::{Context, EventLoop};
pub use crate::util::geometry::{Dpi, Rect, Size};

pub type Result<T> = std::result::Result<T, crate::core::errors::CoreError>;
