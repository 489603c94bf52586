//! Screen ↔ logical coordinate conversion.
//!
//! Every interaction (drag, resize, box-select, drop placement) converts pointer
//! positions through the same functions, so they all agree on one logical space
//! regardless of the current zoom.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Convert a screen point to logical units relative to `origin`.
#[must_use]
pub fn to_logical(screen: Point, origin: Point, scale: f64) -> Point {
    Point {
        x: (screen.x - origin.x) / scale,
        y: (screen.y - origin.y) / scale,
    }
}

/// Placement of the logical surface on screen.
///
/// `origin` is the screen position of logical `(0, 0)` in CSS pixels.
/// `scale` is the zoom factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Point,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin: Point::default(), scale: 1.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point to logical coordinates.
    #[must_use]
    pub fn to_logical(&self, screen: Point) -> Point {
        to_logical(screen, self.origin, self.scale)
    }

    /// Convert a logical point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, logical: Point) -> Point {
        Point {
            x: logical.x * self.scale + self.origin.x,
            y: logical.y * self.scale + self.origin.y,
        }
    }

    /// Convert a screen-space distance (pixels) to a logical distance.
    #[must_use]
    pub fn screen_dist_to_logical(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
