//! Integer geometry values produced by geometry calculators

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the diagram canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Copy of this point moved by `(dx, dy)`.
    ///
    /// Coordinates wrap on overflow, so translating by a
    /// [`delta_from`](Self::delta_from) offset always lands on the target.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Offset that moves `other` onto `self`, wrapping on overflow
    pub fn delta_from(self, other: Point) -> (i32, i32) {
        (self.x.wrapping_sub(other.x), self.y.wrapping_sub(other.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a drawn element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size anchored at `origin`
    pub fn at(origin: Point, size: Dimension) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max_x(&self) -> i32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x={}, y={}, w={}, h={}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Line segment between two connection points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Bounding box spanned by the two end points
    pub fn spanning_bounds(&self) -> Rectangle {
        let x = self.start.x.min(self.end.x);
        let y = self.start.y.min(self.end.y);
        Rectangle::new(
            x,
            y,
            (self.start.x - self.end.x).abs(),
            (self.start.y - self.end.y).abs(),
        )
    }
}
