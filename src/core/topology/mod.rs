//! Screen topology.
//!
//! Tracks virtual desktops, the screens each one hosts and the primary
//! screen, reconciling display-server notifications into add/remove/update
//! notifications for the windowing layer.

pub mod desktop;
pub mod events;
pub mod model;
pub mod query;
pub mod resources;
pub mod screen;
pub mod types;


pub use desktop::VirtualDesktop;
pub use events::{NotificationSink, ProtocolEvent, ScreenEvent};
pub use model::{OutputTransition, TopologyModel, TopologySettings};
pub use query::{CrtcInfo, DesktopDescriptor, DescriptorQuery, ModeInfo, MonitorInfo, OutputInfo};
pub use resources::{HintStyle, SubpixelType, XResources};
pub use screen::{DesktopMetrics, MonitorBinding, Screen, ScreenChanges};
pub use types::{Connection, CrtcId, ModeId, Orientation, OutputId, RootId, Rotation, ScreenId};
