//! Hit-test geometry and selection outlines.
//!
//! Geometry is independent of what a shape draws: a shape may render at
//! full size while exposing a zero-area geometry, which keeps it out of
//! picking, marquee selection, and snapping entirely.

use kurbo::{Point, Rect};

/// A shape's hit-testable region in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub rect: Rect,
    /// Interior counts as a hit, not only the outline.
    pub filled: bool,
}

impl Geometry {
    /// Degenerate geometry at the origin. Never hit, never selected.
    pub const fn zero() -> Self {
        Self {
            rect: Rect::ZERO,
            filled: false,
        }
    }

    /// Filled rectangle from the origin.
    pub fn filled_rect(width: f64, height: f64) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, width.max(0.0), height.max(0.0)),
            filled: true,
        }
    }

    pub fn is_zero_area(&self) -> bool {
        self.rect.area() <= 0.0
    }

    /// Whether a local point hits this geometry.
    pub fn hit(&self, point: Point) -> bool {
        self.filled && !self.is_zero_area() && self.rect.contains(point)
    }

    /// The geometry moved to page position `(x, y)`.
    pub fn page_rect(&self, x: f64, y: f64) -> Rect {
        self.rect + kurbo::Vec2::new(x, y)
    }
}

/// Selection highlight the host draws around a selected shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub rect: Rect,
    pub radius: f64,
}
