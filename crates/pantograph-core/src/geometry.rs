//! Geometric primitives and the anchor-point math used by connector routing.
//!
//! Everything in this module is a pure function over value types. The editor
//! engine layers interaction state on top; nothing here is stateful.

use thiserror::Error;

/// Two node centers coincide, so no direction vector exists between them.
///
/// Anchor computation refuses to produce NaN coordinates; callers pick a
/// fallback anchor instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coincident centers at ({x}, {y}): no border intersection exists")]
pub struct DegenerateGeometry {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Clamps both coordinates into the given inclusive ranges.
    ///
    /// When a range is inverted (`max < min`, e.g. a node larger than the
    /// canvas) the minimum wins.
    pub fn clamp(self, min: Point, max: Point) -> Self {
        Self {
            x: self.x.min(max.x).max(min.x),
            y: self.y.min(max.y).max(min.y),
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self { width, height }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds directly from edge coordinates.
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates bounds from a top-left origin and a size.
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            min_x: origin.x(),
            min_y: origin.y(),
            max_x: origin.x() + size.width(),
            max_y: origin.y() + size.height(),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns the center of the bounds
    pub fn center(self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Checks whether a point lies inside the bounds (edges inclusive).
    pub fn contains(self, point: Point) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }

    /// Axis-aligned overlap test.
    ///
    /// Strict inequalities throughout: two bounds that merely share an edge
    /// do not overlap.
    pub fn overlaps(self, other: Bounds) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Checks whether the horizontal extents of two bounds intersect.
    pub fn overlaps_horizontally(self, other: Bounds) -> bool {
        self.min_x < other.max_x && self.max_x > other.min_x
    }

    /// Checks whether the vertical extents of two bounds intersect.
    pub fn overlaps_vertically(self, other: Bounds) -> bool {
        self.min_y < other.max_y && self.max_y > other.min_y
    }

    /// Moves the bounds by the specified offset
    pub fn translate(self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x(),
            min_y: self.min_y + offset.y(),
            max_x: self.max_x + offset.x(),
            max_y: self.max_y + offset.y(),
        }
    }
}

/// Finds the point where the ray from `center` toward `target` crosses the
/// border of the axis-aligned rectangle centered at `center` with dimensions
/// `size`.
///
/// The ratio `|half_extent / direction|` is computed per axis; an axis with a
/// zero direction component cannot constrain the ray and contributes an
/// infinite ratio, so the other axis decides. The smaller ratio scales the
/// direction vector onto the border.
///
/// # Errors
///
/// Returns [`DegenerateGeometry`] when `center` and `target` coincide; there
/// is no direction to intersect along, and propagating the division would
/// produce NaN coordinates.
pub fn border_intersection(
    center: Point,
    size: Size,
    target: Point,
) -> Result<Point, DegenerateGeometry> {
    let direction = target.sub_point(center);
    if direction.is_zero() {
        return Err(DegenerateGeometry {
            x: center.x(),
            y: center.y(),
        });
    }

    let half_width = size.width() / 2.0;
    let half_height = size.height() / 2.0;

    let ratio_x = if direction.x() == 0.0 {
        f32::INFINITY
    } else {
        (half_width / direction.x()).abs()
    };
    let ratio_y = if direction.y() == 0.0 {
        f32::INFINITY
    } else {
        (half_height / direction.y()).abs()
    };

    Ok(center.add_point(direction.scale(ratio_x.min(ratio_y))))
}

/// Angle of the segment from `p1` to `p2`, in degrees.
///
/// Measured from the positive x-axis, counter-clockwise positive in
/// mathematical convention (y grows downward on the canvas, so visually the
/// angle winds clockwise). Range is (-180, 180].
pub fn angle_degrees(p1: Point, p2: Point) -> f32 {
    (p2.y() - p1.y()).atan2(p2.x() - p1.x()).to_degrees()
}
