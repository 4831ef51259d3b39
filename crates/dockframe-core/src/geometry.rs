#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A pointer position in station pixel space.
///
/// Signed so that positions left of or above a station can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Point) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

/// A half-open rectangle for layout bounds and hit testing.
///
/// Uses pixel coordinates (origin at top-left). `x..x + width` and
/// `y..y + height` are the covered ranges. A width or height `<= 0` is a
/// degenerate rectangle: valid, but it contains no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Area in square pixels; zero for degenerate rectangles.
    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        i64::from(self.width) * i64::from(self.height)
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Center point, rounded toward the top-left.
    #[inline]
    pub const fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
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

    /// Check whether two rectangles share any interior point.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection_opt(other).is_some()
    }

    /// Create a new rectangle that is the union of this rectangle and another.
    ///
    /// The result is the smallest rectangle that contains both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect};
    use proptest::prelude::*;

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(Point::new(2, 3)));
        assert!(rect.contains(Point::new(5, 7)));
        assert!(!rect.contains(Point::new(6, 3)));
        assert!(!rect.contains(Point::new(2, 8)));
        assert!(!rect.contains(Point::new(1, 3)));
    }

    #[test]
    fn degenerate_rect_contains_nothing() {
        let rect = Rect::new(0, 0, 0, 10);
        assert!(rect.is_empty());
        assert_eq!(rect.area(), 0);
        assert!(!rect.contains(Point::new(0, 0)));

        let negative = Rect::new(5, 5, -3, 4);
        assert!(negative.is_empty());
        assert_eq!(negative.area(), 0);
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
        assert!(a.intersects(&b));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 300, 400);
        let b = Rect::new(300, 0, 200, 400);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 1, 2, 4);
        assert_eq!(a.union(&b), Rect::new(0, 0, 7, 5));
    }

    #[test]
    fn rect_serializes_as_plain_fields() {
        let json = serde_json::to_value(Rect::new(1, 2, 3, 4)).expect("rect serializes");
        assert_eq!(
            json,
            serde_json::json!({"x": 1, "y": 2, "width": 3, "height": 4})
        );
    }

    proptest! {
        #[test]
        fn intersection_is_contained_in_both(
            ax in -100i32..100, ay in -100i32..100, aw in 0i32..100, ah in 0i32..100,
            bx in -100i32..100, by in -100i32..100, bw in 0i32..100, bh in 0i32..100,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            if let Some(i) = a.intersection_opt(&b) {
                prop_assert!(i.x >= a.x && i.right() <= a.right());
                prop_assert!(i.y >= b.y && i.bottom() <= b.bottom());
                prop_assert!(i.area() <= a.area().min(b.area()));
            }
        }
    }
}
