//! Geometric primitives for detected diagram elements.
//!
//! This module provides the geometric types used throughout flowsketch to
//! describe where shapes, text fragments and connectors were detected in the
//! source image.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in image space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned bounding box
//! - [`polygon_area`] / [`polygon_perimeter`] - Contour metrics
//!
//! # Coordinate System
//!
//! Coordinates are image pixels, consistent with the raster the detections
//! were produced from:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinate space.
///
/// # Examples
///
/// ```
/// # use flowsketch_core::geometry::Point;
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
///
/// assert_eq!(p1.distance(p2), 5.0);
/// assert_eq!(p2.sub_point(p1), Point::new(3.0, 4.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
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

    /// Returns true if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
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

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Shortest distance from this point to the segment `a`–`b`.
    ///
    /// Degenerates to the point distance when `a == b`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsketch_core::geometry::Point;
    /// let a = Point::new(0.0, 0.0);
    /// let b = Point::new(10.0, 0.0);
    ///
    /// assert_eq!(Point::new(5.0, 3.0).distance_to_segment(a, b), 3.0);
    /// assert_eq!(Point::new(13.0, 4.0).distance_to_segment(a, b), 5.0);
    /// ```
    pub fn distance_to_segment(self, a: Point, b: Point) -> f32 {
        let ab = b.sub_point(a);
        let len_sq = ab.x * ab.x + ab.y * ab.y;
        if len_sq == 0.0 {
            return self.distance(a);
        }

        let ap = self.sub_point(a);
        let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
        self.distance(a.add_point(ab.scale(t)))
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

    /// Returns the enclosed area
    pub fn area(self) -> f32 {
        self.width * self.height
    }

    /// Width divided by height, or 0 for a zero height
    pub fn aspect_ratio(self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }
}

/// An axis-aligned bounding box.
///
/// Serialized as `{ "x", "y", "w", "h" }` with `(x, y)` the top-left corner,
/// matching the format produced by detection passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoxRepr", into = "BoxRepr")]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

#[derive(Serialize, Deserialize)]
struct BoxRepr {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl From<BoxRepr> for Bounds {
    fn from(repr: BoxRepr) -> Self {
        Self {
            min_x: repr.x,
            min_y: repr.y,
            max_x: repr.x + repr.w,
            max_y: repr.y + repr.h,
        }
    }
}

impl From<Bounds> for BoxRepr {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: bounds.min_x,
            y: bounds.min_y,
            w: bounds.width(),
            h: bounds.height(),
        }
    }
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates a new bounds from the `x, y, w, h` form used by detectors
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new_from_top_left(Point::new(x, y), Size::new(w, h))
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

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the enclosed area
    pub fn area(self) -> f32 {
        self.to_size().area()
    }

    /// Returns the length of the diagonal
    pub fn diagonal(self) -> f32 {
        self.width().hypot(self.height())
    }

    /// Returns true if all coordinates are finite and the extent is non-negative
    pub fn is_valid(self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.width() >= 0.0
            && self.height() >= 0.0
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsketch_core::geometry::Bounds;
    /// let left = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
    /// let right = Bounds::from_xywh(20.0, 5.0, 10.0, 10.0);
    ///
    /// let union = left.merge(&right);
    /// assert_eq!(union.width(), 30.0);
    /// assert_eq!(union.height(), 15.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Area of the intersection of two bounds, zero when disjoint
    pub fn intersection_area(&self, other: &Self) -> f32 {
        let width = self.max_x.min(other.max_x) - self.min_x.max(other.min_x);
        let height = self.max_y.min(other.max_y) - self.min_y.max(other.min_y);
        width.max(0.0) * height.max(0.0)
    }

    /// Intersection area relative to the smaller of the two areas.
    ///
    /// A fragment fully inside a larger shape yields `1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsketch_core::geometry::Bounds;
    /// let outer = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    /// let inner = Bounds::from_xywh(10.0, 10.0, 20.0, 20.0);
    ///
    /// assert_eq!(outer.overlap_ratio(&inner), 1.0);
    /// ```
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / smaller
    }

    /// Distance from a point to the nearest point of the bounds, zero inside
    pub fn distance_to_point(&self, point: Point) -> f32 {
        let dx = (self.min_x - point.x).max(point.x - self.max_x).max(0.0);
        let dy = (self.min_y - point.y).max(point.y - self.max_y).max(0.0);
        dx.hypot(dy)
    }
}

/// Area enclosed by a closed polygon (shoelace formula).
///
/// Returns zero for fewer than three points.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice_area.abs() / 2.0
}

/// Perimeter of a closed polygon.
///
/// Returns zero for fewer than two points.
pub fn polygon_perimeter(points: &[Point]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance(*b))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(1.0, 1.0);
        let p2 = Point::new(4.0, 5.0);
        assert_eq!(p1.distance(p2), 5.0);
        assert_eq!(p2.distance(p1), 5.0);
        assert_eq!(p1.distance(p1), 0.0);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_distance_to_segment_projection_inside() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 10.0);
        assert_eq!(Point::new(4.0, 5.0).distance_to_segment(a, b), 4.0);
    }

    #[test]
    fn test_distance_to_segment_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(Point::new(-3.0, 4.0).distance_to_segment(a, b), 5.0);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert_eq!(Point::new(5.0, 6.0).distance_to_segment(a, a), 5.0);
    }

    #[test]
    fn test_size_aspect_ratio() {
        assert_eq!(Size::new(20.0, 10.0).aspect_ratio(), 2.0);
        assert_eq!(Size::new(20.0, 0.0).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_bounds_from_xywh() {
        let bounds = Bounds::from_xywh(10.0, 20.0, 30.0, 40.0);

        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.width(), 30.0);
        assert_eq!(bounds.height(), 40.0);
        assert_eq!(bounds.area(), 1200.0);
        assert_eq!(bounds.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_bounds_diagonal() {
        assert_eq!(Bounds::from_xywh(0.0, 0.0, 3.0, 4.0).diagonal(), 5.0);
    }

    #[test]
    fn test_bounds_is_valid() {
        assert!(Bounds::from_xywh(0.0, 0.0, 3.0, 4.0).is_valid());
        assert!(Bounds::from_xywh(0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Bounds::from_xywh(0.0, 0.0, -3.0, 4.0).is_valid());
        assert!(!Bounds::from_xywh(f32::NAN, 0.0, 3.0, 4.0).is_valid());
    }

    #[test]
    fn test_bounds_intersection_area() {
        let a = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_xywh(5.0, 5.0, 10.0, 10.0);
        let c = Bounds::from_xywh(50.0, 50.0, 10.0, 10.0);

        assert_eq!(a.intersection_area(&b), 25.0);
        assert_eq!(a.intersection_area(&c), 0.0);
    }

    #[test]
    fn test_bounds_overlap_ratio_uses_smaller_area() {
        let big = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
        let small = Bounds::from_xywh(90.0, 90.0, 20.0, 20.0);

        // 10x10 of the 20x20 box overlaps
        assert_eq!(big.overlap_ratio(&small), 0.25);
        assert_eq!(small.overlap_ratio(&big), 0.25);
    }

    #[test]
    fn test_bounds_overlap_ratio_zero_area() {
        let empty = Bounds::from_xywh(5.0, 5.0, 0.0, 0.0);
        let other = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert_eq!(empty.overlap_ratio(&other), 0.0);
    }

    #[test]
    fn test_bounds_distance_to_point() {
        let bounds = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);

        assert_eq!(bounds.distance_to_point(Point::new(10.0, 10.0)), 0.0);
        assert_eq!(bounds.distance_to_point(Point::new(11.0, 5.0)), 1.0);
        assert_eq!(bounds.distance_to_point(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(bounds.distance_to_point(Point::new(13.0, 5.0)), 3.0);
        assert_eq!(bounds.distance_to_point(Point::new(13.0, 14.0)), 5.0);
    }

    #[test]
    fn test_bounds_serde_uses_xywh() {
        let bounds = Bounds::from_xywh(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"w":3.0,"h":4.0}"#);

        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bounds);
    }

    #[test]
    fn test_polygon_area_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(polygon_perimeter(&square), 40.0);
    }

    #[test]
    fn test_polygon_area_orientation_independent() {
        let clockwise = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        assert_eq!(polygon_area(&clockwise), 100.0);
    }

    #[test]
    fn test_polygon_degenerate() {
        assert_eq!(polygon_area(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]), 0.0);
        assert_eq!(polygon_perimeter(&[Point::new(0.0, 0.0)]), 0.0);
    }
}
