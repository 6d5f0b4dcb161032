//! Geometry primitives shared by the layout engine and its hosts

use std::ops::{Add, Sub};

/// A 2D offset in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetF {
    pub x: f64,
    pub y: f64,
}

impl OffsetF {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Same offset with the x component replaced
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    /// Same offset with the y component replaced
    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }
}

impl Add for OffsetF {
    type Output = OffsetF;

    fn add(self, rhs: OffsetF) -> OffsetF {
        OffsetF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for OffsetF {
    type Output = OffsetF;

    fn sub(self, rhs: OffsetF) -> OffsetF {
        OffsetF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Shrink by the total padding on each axis, never below zero
    pub fn minus_padding(&self, padding: &PaddingPropertyF) -> SizeF {
        SizeF::new(
            (self.width - padding.horizontal()).max(0.0),
            (self.height - padding.vertical()).max(0.0),
        )
    }
}

/// A size where each axis may be left undetermined
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OptionalSizeF {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl OptionalSizeF {
    pub fn new(width: Option<f64>, height: Option<f64>) -> Self {
        Self { width, height }
    }

    pub fn from_size(size: SizeF) -> Self {
        Self::new(Some(size.width), Some(size.height))
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = Some(width);
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = Some(height);
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_offset_size(offset: OffsetF, size: SizeF) -> Self {
        Self::new(offset.x, offset.y, size.width, size.height)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn offset(&self) -> OffsetF {
        OffsetF::new(self.x, self.y)
    }

    pub fn size(&self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    /// Smallest rectangle containing both
    pub fn combine(&self, other: &RectF) -> RectF {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        RectF::new(x, y, right - x, bottom - y)
    }

    /// Overlapping part of both rectangles, clipped to zero extent per axis
    pub fn intersect(&self, other: &RectF) -> RectF {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        RectF::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Check if this rectangle intersects another
    pub fn intersects(&self, other: &RectF) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Resolved padding, border or margin widths
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddingPropertyF {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Margins share the padding representation
pub type MarginPropertyF = PaddingPropertyF;

impl PaddingPropertyF {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn origin(&self) -> OffsetF {
        OffsetF::new(self.left, self.top)
    }

    /// Component-wise sum, used to merge padding and border
    pub fn merged(&self, other: &PaddingPropertyF) -> PaddingPropertyF {
        PaddingPropertyF::new(
            self.left + other.left,
            self.right + other.right,
            self.top + other.top,
            self.bottom + other.bottom,
        )
    }
}
