//! Core value types for the layout model.

use std::fmt;

/// A concrete width/height pair, e.g. a solved minimum or preferred size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The same size with width and height exchanged (portrait <-> landscape).
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Squared length of the diagonal.
    pub fn diagonal_squared(&self) -> f64 {
        self.width * self.width + self.height * self.height
    }

    /// Check if this size fits into `other` on both axes.
    pub fn fits_in(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Extent along the given layout direction.
    pub fn along(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A size hint whose components may be undefined.
///
/// Undefined is not zero: an undefined minimum falls back to the preferred
/// value, an undefined preferred value adds no preference, and an undefined
/// maximum leaves the area unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeHint {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeHint {
    pub const UNDEFINED: Self = Self { width: None, height: None };

    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Build a hint from raw measurements, treating negative or non-finite
    /// values as undefined.
    pub fn from_raw(width: f64, height: f64) -> Self {
        fn defined(value: f64) -> Option<f64> {
            (value.is_finite() && value >= 0.0).then_some(value)
        }
        Self {
            width: defined(width),
            height: defined(height),
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Fill undefined components from `fallback`.
    pub fn or(&self, fallback: SizeHint) -> SizeHint {
        SizeHint {
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
        }
    }

    /// Component along the given axis.
    pub fn along(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

impl From<Size> for SizeHint {
    fn from(size: Size) -> Self {
        SizeHint::new(size.width, size.height)
    }
}

/// Layout direction of a fragment: the axis along which its children follow
/// each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Children laid out left to right.
    #[default]
    Horizontal,
    /// Children laid out top to bottom.
    Vertical,
}

impl Direction {
    /// The other direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Coordinate axis along which children are chained.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Horizontal => Axis::X,
            Direction::Vertical => Axis::Y,
        }
    }

    /// Single character tag used in structural ids.
    pub fn tag(self) -> char {
        match self {
            Direction::Horizontal => 'h',
            Direction::Vertical => 'v',
        }
    }
}

/// A coordinate axis. X-tabs are vertical lines, Y-tabs horizontal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create bounds from its four edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_hint_from_raw() {
        let hint = SizeHint::from_raw(10.0, -1.0);
        assert_eq!(hint.width, Some(10.0));
        assert_eq!(hint.height, None);
        assert!(SizeHint::from_raw(f64::NAN, -2.0).is_undefined());
    }

    #[test]
    fn test_size_hint_fallback() {
        let min = SizeHint { width: None, height: Some(5.0) };
        let resolved = min.or(SizeHint::new(20.0, 30.0));
        assert_eq!(resolved, SizeHint::new(20.0, 5.0));
    }

    #[test]
    fn test_direction_flip() {
        assert_eq!(Direction::Horizontal.flipped(), Direction::Vertical);
        assert_eq!(Direction::Vertical.flipped().flipped(), Direction::Vertical);
        assert_eq!(Direction::default(), Direction::Horizontal);
    }

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::from_edges(10.0, 20.0, 40.0, 70.0);
        assert_eq!(b.width, 30.0);
        assert_eq!(b.height, 50.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.bottom(), 70.0);
        assert_eq!(b.area(), 1500.0);
    }

    #[test]
    fn test_size_fits() {
        assert!(Size::new(5.0, 5.0).fits_in(&Size::new(5.0, 6.0)));
        assert!(!Size::new(7.0, 5.0).fits_in(&Size::new(5.0, 6.0)));
        assert_eq!(Size::new(3.0, 4.0).swapped(), Size::new(4.0, 3.0));
    }
}
