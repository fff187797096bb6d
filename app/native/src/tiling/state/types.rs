//! Core value types for the tiling window manager.
//!
//! Geometry, axes and directions shared by the container tree, the layout
//! engine and the window system seam.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Geometry Types
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Get the center point of this rectangle.
    #[must_use]
    pub fn center(&self) -> (f64, f64) { (self.x + self.width / 2.0, self.y + self.height / 2.0) }

    /// Returns `true` if the two rectangles overlap on the horizontal axis.
    #[must_use]
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Returns `true` if the two rectangles overlap on the vertical axis.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Self) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }

    /// Shrinks the rectangle by the given insets (top, right, bottom, left).
    #[must_use]
    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Returns this rectangle centered within `outer`, keeping its size.
    #[must_use]
    pub fn centered_in(&self, outer: &Self) -> Self {
        Self::new(
            outer.x + (outer.width - self.width) / 2.0,
            outer.y + (outer.height - self.height) / 2.0,
            self.width,
            self.height,
        )
    }

    /// Returns this rectangle moved by the given offset.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Check if two rectangles are approximately equal (within epsilon).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }
}

// ============================================================================
// Window Handle
// ============================================================================

/// Opaque native window handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

// ============================================================================
// Layout & Direction
// ============================================================================

/// Axis a split container lays its children out along.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Children side by side, left to right.
    #[default]
    Horizontal,
    /// Children stacked, top to bottom.
    Vertical,
}

impl Layout {
    /// Returns the layout name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// Returns the other axis.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Picks the axis that follows a rectangle's orientation.
    #[must_use]
    pub fn for_rect(rect: &Rect) -> Self {
        if rect.height > rect.width { Self::Vertical } else { Self::Horizontal }
    }
}

/// A cardinal direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Returns the layout axis this direction moves along.
    #[must_use]
    pub const fn axis(self) -> Layout {
        match self {
            Self::Left | Self::Right => Layout::Horizontal,
            Self::Up | Self::Down => Layout::Vertical,
        }
    }

    /// Returns `true` for Right and Down, the directions of increasing index.
    #[must_use]
    pub const fn is_forward(self) -> bool { matches!(self, Self::Right | Self::Down) }

    /// Parses a direction name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Dimension targeted by a resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeDimension {
    Width,
    Height,
}

impl ResizeDimension {
    /// Returns the layout axis a resize of this dimension happens along.
    #[must_use]
    pub const fn axis(self) -> Layout {
        match self {
            Self::Width => Layout::Horizontal,
            Self::Height => Layout::Vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod rect_tests {
        use super::*;

        #[test]
        fn test_rect_contains_point() {
            let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
            assert!(rect.contains_point(50.0, 50.0));
            assert!(rect.contains_point(0.0, 0.0));
            assert!(!rect.contains_point(100.0, 100.0));
            assert!(!rect.contains_point(-1.0, 50.0));
        }

        #[test]
        fn test_rect_overlaps() {
            let a = Rect::new(0.0, 0.0, 1000.0, 800.0);
            let b = Rect::new(1000.0, 200.0, 1000.0, 800.0);
            assert!(a.overlaps_vertically(&b));
            assert!(!a.overlaps_horizontally(&b));
        }

        #[test]
        fn test_rect_inset() {
            let rect = Rect::new(0.0, 0.0, 100.0, 100.0).inset(10.0, 5.0, 10.0, 5.0);
            assert!(rect.approx_eq(&Rect::new(5.0, 10.0, 90.0, 80.0), 0.001));
        }

        #[test]
        fn test_rect_centered_in() {
            let outer = Rect::new(100.0, 100.0, 400.0, 200.0);
            let inner = Rect::new(0.0, 0.0, 200.0, 100.0).centered_in(&outer);
            assert!(inner.approx_eq(&Rect::new(200.0, 150.0, 200.0, 100.0), 0.001));
        }
    }

    mod direction_tests {
        use super::*;

        #[test]
        fn test_inverse_and_axis() {
            assert_eq!(Direction::Left.inverse(), Direction::Right);
            assert_eq!(Direction::Up.inverse(), Direction::Down);
            assert_eq!(Direction::Left.axis(), Layout::Horizontal);
            assert_eq!(Direction::Down.axis(), Layout::Vertical);
        }

        #[test]
        fn test_parse() {
            assert_eq!(Direction::parse("up"), Some(Direction::Up));
            assert_eq!(Direction::parse("north"), None);
        }

        #[test]
        fn test_layout_for_rect() {
            assert_eq!(Layout::for_rect(&Rect::new(0.0, 0.0, 1920.0, 1080.0)), Layout::Horizontal);
            assert_eq!(Layout::for_rect(&Rect::new(0.0, 0.0, 1080.0, 1920.0)), Layout::Vertical);
        }
    }
}
