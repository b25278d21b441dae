#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Node placement happens in a continuous canvas space (origin at top-left,
//! y grows downward), so everything here is `f32`.

use crate::direction::{Axis, Direction};

/// A point or displacement in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Coordinate along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Copy with the coordinate along `axis` replaced.
    #[inline]
    #[must_use]
    pub const fn with(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Horizontal => Self::new(value, self.y),
            Axis::Vertical => Self::new(self.x, value),
        }
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width and height of a node or block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Grow (or shrink) by `(dw, dh)`, clamping each extent to at least `min`.
    #[must_use]
    pub fn grown(self, dw: f32, dh: f32, min: f32) -> Self {
        Self::new((self.width + dw).max(min), (self.height + dh).max(min))
    }
}

/// An axis-aligned rectangle used for node bounds, block bounds, and hit
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a location and a size.
    #[inline]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies inside (right and bottom edges exclusive).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Corner reached when walking the outline clockwise in direction `dir`.
    ///
    /// East ends at the top-right, south at the bottom-right, west at the
    /// bottom-left and north at the top-left corner.
    #[inline]
    pub fn corner(&self, dir: Direction) -> Point {
        match dir {
            Direction::East => Point::new(self.right(), self.y),
            Direction::South => Point::new(self.right(), self.bottom()),
            Direction::West => Point::new(self.x, self.bottom()),
            Direction::North => Point::new(self.x, self.y),
        }
    }

    /// The four corners, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.corner(Direction::North),
            self.corner(Direction::East),
            self.corner(Direction::South),
            self.corner(Direction::West),
        ]
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Overlap of both rectangles, or `None` if they only touch or are apart.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Check whether the rectangles overlap with positive area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection_opt(other).is_some()
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Bounding box of a point cloud, `None` when empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in iter {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Even-odd point-in-polygon test for a closed outline.
pub fn polygon_contains(polygon: &[Point], p: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains(Point::new(2.0, 3.0)));
        assert!(rect.contains(Point::new(5.5, 7.5)));
        assert!(!rect.contains(Point::new(6.0, 3.0)));
        assert!(!rect.contains(Point::new(2.0, 8.0)));
    }

    #[test]
    fn rect_union_disjoint() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(10.0, 10.0, 3.0, 3.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 13.0, 13.0));
    }

    #[test]
    fn rect_intersection_adjacent_no_overlap() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(5.0, 0.0, 5.0, 5.0);
        assert_eq!(a.intersection_opt(&b), None);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn corners_run_clockwise() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            r.corners(),
            [
                Point::new(1.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 6.0),
                Point::new(1.0, 6.0),
            ]
        );
    }

    #[test]
    fn bounding_of_points() {
        let pts = [Point::new(3.0, 1.0), Point::new(-1.0, 4.0), Point::new(2.0, 2.0)];
        assert_eq!(Rect::bounding(pts), Some(Rect::new(-1.0, 1.0, 4.0, 3.0)));
        assert_eq!(Rect::bounding(std::iter::empty()), None);
    }

    #[test]
    fn l_shaped_polygon_containment() {
        // 20x10 bar on top, 10x10 foot below its left half.
        let poly = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
        ];
        assert!(polygon_contains(&poly, Point::new(15.0, 5.0)));
        assert!(polygon_contains(&poly, Point::new(5.0, 15.0)));
        assert!(!polygon_contains(&poly, Point::new(15.0, 15.0)));
    }

    #[test]
    fn size_grown_clamps() {
        let s = Size::new(12.0, 30.0).grown(-10.0, 5.0, 10.0);
        assert_eq!(s, Size::new(10.0, 35.0));
    }

    #[test]
    fn point_axis_accessors() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.along(Axis::Horizontal), 3.0);
        assert_eq!(p.with(Axis::Vertical, 9.0), Point::new(3.0, 9.0));
    }
}
