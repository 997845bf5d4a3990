//! Integer geometry shared by the topology model.

/// Millimetres per inch, used for DPI <-> physical size conversions.
pub const MM_PER_INCH: f64 = 25.4;

/// 2D size in pixels or millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self { width: 0, height: 0 }
    }

    /// A size is empty when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Swap width and height.
    pub fn transposed(&self) -> Self {
        Self { width: self.height, height: self.width }
    }
}

/// Axis-aligned rectangle in root-window coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn zero() -> Self {
        Self { x: 0, y: 0, width: 0, height: 0 }
    }

    /// Rectangle at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Same origin, width and height swapped.
    pub fn transposed(&self) -> Self {
        Self::new(self.x, self.y, self.height, self.width)
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        px >= self.x as i64
            && px < self.right()
            && py >= self.y as i64
            && py < self.bottom()
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x as i64 >= self.x as i64
                && other.y as i64 >= self.y as i64
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Intersection of two rectangles; `Rect::zero()` when they do not overlap.
    pub fn intersected(&self, other: &Rect) -> Rect {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::zero();
        }
        Rect::new(left as i32, top as i32, (right - left) as u32, (bottom - top) as u32)
    }

    fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

/// Dots per inch, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl Dpi {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(value: f64) -> Self {
        Self { x: value, y: value }
    }

    /// DPI derived from a pixel size and its physical size in millimetres.
    /// Axes without a physical dimension report 0.
    pub fn from_physical(pixels: Size, millimeters: Size) -> Self {
        let axis = |px: u32, mm: u32| {
            if mm == 0 {
                0.0
            } else {
                MM_PER_INCH * px as f64 / mm as f64
            }
        };
        Self {
            x: axis(pixels.width, millimeters.width),
            y: axis(pixels.height, millimeters.height),
        }
    }

    /// Raise each axis to at least `floor`.
    pub fn clamped_to(&self, floor: f64) -> Self {
        Self {
            x: self.x.max(floor),
            y: self.y.max(floor),
        }
    }
}

/// Back-compute a physical size from a pixel size at the given DPI.
pub fn size_in_millimeters(pixels: Size, dpi: Dpi) -> Size {
    let axis = |px: u32, dpi: f64| {
        if dpi <= 0.0 {
            0
        } else {
            (MM_PER_INCH * px as f64 / dpi).round() as u32
        }
    };
    Size::new(axis(pixels.width, dpi.x), axis(pixels.height, dpi.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let work_area = Rect::new(0, 32, 1920, 1048);
        assert_eq!(screen.intersected(&work_area), Rect::new(0, 32, 1920, 1048));

        let right = Rect::new(1920, 0, 1280, 1024);
        assert_eq!(right.intersected(&work_area), Rect::zero());
        assert!(screen.contains_rect(&screen.intersected(&work_area)));
    }

    #[test]
    fn test_negative_origin_intersection() {
        let left = Rect::new(-1280, 0, 1280, 1024);
        let desktop = Rect::new(-1280, 0, 3200, 1080);
        assert_eq!(left.intersected(&desktop), left);
        assert!(left.contains_point(-1, 10));
        assert!(!left.contains_point(0, 10));
    }

    #[test]
    fn test_dpi_and_millimeters() {
        let dpi = Dpi::from_physical(Size::new(1920, 1080), Size::new(508, 286));
        assert!((dpi.x - 96.0).abs() < 0.01);
        assert_eq!(Dpi::from_physical(Size::new(1920, 1080), Size::zero()), Dpi::new(0.0, 0.0));

        assert_eq!(size_in_millimeters(Size::new(960, 480), Dpi::uniform(96.0)), Size::new(254, 127));
        assert_eq!(size_in_millimeters(Size::new(960, 480), Dpi::uniform(0.0)), Size::zero());
        assert_eq!(Dpi::new(72.0, 120.0).clamped_to(96.0), Dpi::new(96.0, 120.0));
    }
}
