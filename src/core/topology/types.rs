//! Protocol handles and small enums shared across the topology model.

use std::fmt;

/// RandR output handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u32);

/// RandR CRTC (scanout controller) handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrtcId(pub u32);

/// RandR mode handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeId(pub u32);

/// Root window of a virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u32);

/// Stable identity of a screen as seen by the windowing layer.
///
/// Survives placeholder transformations in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub u32);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Output connection state as reported by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connection {
    Connected,
    Disconnected,
    Unknown,
}

/// CRTC rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Normal,
    /// 90 degrees (`xrandr --rotate left`)
    Left,
    /// 180 degrees
    Inverted,
    /// 270 degrees (`xrandr --rotate right`)
    Right,
}

impl Rotation {
    pub const ROTATE_0: u16 = 1;
    pub const ROTATE_90: u16 = 2;
    pub const ROTATE_180: u16 = 4;
    pub const ROTATE_270: u16 = 8;
    /// Reflection bits are carried alongside the rotation bit.
    const ROTATION_MASK: u16 = 0x0f;

    /// Decode a RandR rotation bitmask. Reflection bits are ignored.
    pub fn from_randr(code: u16) -> Option<Self> {
        match code & Self::ROTATION_MASK {
            Self::ROTATE_0 => Some(Rotation::Normal),
            Self::ROTATE_90 => Some(Rotation::Left),
            Self::ROTATE_180 => Some(Rotation::Inverted),
            Self::ROTATE_270 => Some(Rotation::Right),
            _ => None,
        }
    }

    pub fn to_randr(self) -> u16 {
        match self {
            Rotation::Normal => Self::ROTATE_0,
            Rotation::Left => Self::ROTATE_90,
            Rotation::Inverted => Self::ROTATE_180,
            Rotation::Right => Self::ROTATE_270,
        }
    }

    /// Whether width and height trade places under this rotation.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }

    pub fn orientation(self) -> Orientation {
        match self {
            Rotation::Normal => Orientation::Landscape,
            Rotation::Left => Orientation::Portrait,
            Rotation::Inverted => Orientation::InvertedLandscape,
            Rotation::Right => Orientation::InvertedPortrait,
        }
    }
}

/// Screen orientation published to the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    InvertedLandscape,
    InvertedPortrait,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_decoding() {
        assert_eq!(Rotation::from_randr(1), Some(Rotation::Normal));
        assert_eq!(Rotation::from_randr(2), Some(Rotation::Left));
        // 180 degrees plus reflect-x
        assert_eq!(Rotation::from_randr(4 | 16), Some(Rotation::Inverted));
        assert_eq!(Rotation::from_randr(0), None);
        assert_eq!(Rotation::from_randr(3), None);
        assert_eq!(Rotation::Right.to_randr(), 8);
    }

    #[test]
    fn test_orientation_mapping() {
        assert_eq!(Rotation::Normal.orientation(), Orientation::Landscape);
        assert_eq!(Rotation::Left.orientation(), Orientation::Portrait);
        assert_eq!(Rotation::Inverted.orientation(), Orientation::InvertedLandscape);
        assert_eq!(Rotation::Right.orientation(), Orientation::InvertedPortrait);
        assert!(Rotation::Right.swaps_axes());
        assert!(!Rotation::Inverted.swaps_axes());
    }
}
