//! Integer pixel geometry used by the viewport.
//!
//! Content coordinates can exceed `i32` for very large grids, so every
//! coordinate is an `i64`.

use std::fmt;

/// A point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0 };

    /// Creates a point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size in pixels. Negative dimensions are treated as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width.
    pub width: i64,
    /// Height.
    pub height: i64,
}

impl Size {
    /// An empty size.
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    /// Creates a size.
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is not positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// An empty rectangle at the origin.
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Creates a rectangle from position and size.
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Left edge.
    pub fn left(&self) -> i64 {
        self.origin.x
    }

    /// Top edge.
    pub fn top(&self) -> i64 {
        self.origin.y
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i64 {
        self.origin.x + self.size.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i64 {
        self.origin.y + self.size.height
    }

    /// Width.
    pub fn width(&self) -> i64 {
        self.size.width
    }

    /// Height.
    pub fn height(&self) -> i64 {
        self.size.height
    }

    /// Returns `true` if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Returns `true` if `point` lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Returns the overlap of two rectangles, or `None` if they do not
    /// overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > left && bottom > top).then(|| Rect::new(left, top, right - left, bottom - top))
    }

    /// Returns this rectangle shifted by `(dx, dy)`.
    pub fn translated(&self, dx: i64, dy: i64) -> Rect {
        Rect::new(self.origin.x + dx, self.origin.y + dy, self.size.width, self.size.height)
    }
}
