//! # Geometry Module
//!
//! Continuous-space primitives shared by every encounter system: points and
//! vectors, axis-aligned boxes, and the four facing directions of the player.

use serde::{Deserialize, Serialize};

/// A point or displacement in world space, measured in pixels.
///
/// # Examples
///
/// ```
/// use drift_encounter::Vec2;
///
/// let a = Vec2::new(0.0, 0.0);
/// let b = Vec2::new(3.0, 4.0);
/// assert_eq!(a.distance(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a new vector with the given components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Euclidean length of the vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in the same direction, or zero for a zero vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use drift_encounter::Vec2;
    ///
    /// assert_eq!(Vec2::new(0.0, 5.0).normalize_or_zero(), Vec2::new(0.0, 1.0));
    /// assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    /// ```
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > f32::EPSILON {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, scale: f32) -> Self {
        Self::new(self.x * scale, self.y * scale)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left position and a size vector.
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Checks whether a point lies inside the rectangle (edges included).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Checks whether this rectangle overlaps another.
    ///
    /// Touching edges count as an overlap, so a swing that just reaches an
    /// enemy's box still connects.
    ///
    /// # Examples
    ///
    /// ```
    /// use drift_encounter::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    /// assert!(!a.overlaps(&Rect::new(10.5, 0.0, 5.0, 5.0)));
    /// ```
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }
}

/// The four directions the player can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit vector pointing the way this facing looks (y grows downward).
    pub fn to_vector(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Whether the facing runs along the vertical axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Facing::Up | Facing::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(5.0, 10.0);
        let b = Vec2::new(3.0, 2.0);
        assert_eq!(a + b, Vec2::new(8.0, 12.0));
        assert_eq!(a - b, Vec2::new(2.0, 8.0));
        assert_eq!(b * 2.0, Vec2::new(6.0, 4.0));
        assert_eq!(-b, Vec2::new(-3.0, -2.0));
    }

    #[test]
    fn test_vec2_normalize() {
        let n = Vec2::new(3.0, 4.0).normalize_or_zero();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn test_vec2_finite() {
        assert!(Vec2::new(1.0, 2.0).is_finite());
        assert!(!Vec2::new(f32::NAN, 2.0).is_finite());
        assert!(!Vec2::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_rect_geometry() {
        let r = Rect::new(5.0, 5.0, 10.0, 8.0);
        assert_eq!(r.right(), 15.0);
        assert_eq!(r.bottom(), 13.0);
        assert_eq!(r.center(), Vec2::new(10.0, 9.0));
        assert!(r.contains(Vec2::new(5.0, 5.0)));
        assert!(r.contains(Vec2::new(15.0, 13.0)));
        assert!(!r.contains(Vec2::new(4.9, 5.0)));
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_facing_vectors() {
        assert_eq!(Facing::Up.to_vector(), Vec2::new(0.0, -1.0));
        assert_eq!(Facing::Right.to_vector(), Vec2::new(1.0, 0.0));
        assert!(Facing::Down.is_vertical());
        assert!(!Facing::Left.is_vertical());
    }
}
