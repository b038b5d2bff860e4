//! 2D vector algebra over fixed-point pairs
//!
//! `Vector2` is a plain `Copy` value; nothing here allocates.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;

/// Position, velocity or force in table space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2::new(Fixed::ZERO, Fixed::ZERO);
    /// Canonical fallback direction for degenerate normals
    pub const UNIT_X: Vector2 = Vector2::new(Fixed::ONE, Fixed::ZERO);
    pub const UNIT_Y: Vector2 = Vector2::new(Fixed::ZERO, Fixed::ONE);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(Fixed::from_f64(x), Fixed::from_f64(y))
    }

    pub fn from_int(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    #[inline]
    pub fn dot(self, rhs: Vector2) -> Fixed {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Raw `x² + y²` in 32.32, exact for every representable vector
    #[inline]
    fn length_squared_wide(self) -> u64 {
        let x = u64::from(self.x.raw().unsigned_abs());
        let y = u64::from(self.y.raw().unsigned_abs());
        x * x + y * y
    }

    /// Dot with self. Saturates past the 16.16 range (lengths over ~181);
    /// use [`magnitude`](Self::magnitude) for distances.
    pub fn length_squared(self) -> Fixed {
        let wide = self.length_squared_wide() >> crate::fixed::FRACTION_BITS;
        Fixed::from_raw(wide.min(i32::MAX as u64) as i32)
    }

    /// Integer square root of the 32.32 sum, which is the 16.16 length
    #[inline]
    pub fn magnitude(self) -> Fixed {
        let root = self.length_squared_wide().isqrt();
        Fixed::from_raw(root.min(i32::MAX as u64) as i32)
    }

    #[inline]
    pub fn distance(self, other: Vector2) -> Fixed {
        (self - other).magnitude()
    }

    /// Unit vector in the same direction. A zero vector divides by epsilon
    /// and stays zero.
    pub fn normalize(self) -> Vector2 {
        self / self.magnitude()
    }

    /// Counter-clockwise perpendicular
    #[inline]
    pub fn perp(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }

    pub fn rotate(self, angle: Fixed) -> Vector2 {
        let (sin, cos) = (angle.sin(), angle.cos());
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Unit direction for an angle measured from +x
    pub fn from_angle(angle: Fixed) -> Vector2 {
        Vector2::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Render-boundary conversion
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_f32(), self.y.to_f32())
    }

    pub fn from_vec2(v: Vec2) -> Self {
        Self::new(Fixed::from_f32(v.x), Fixed::from_f32(v.y))
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Fixed> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, rhs: Fixed) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<Fixed> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn div(self, rhs: Fixed) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        *self = *self - rhs;
    }
}

impl MulAssign<Fixed> for Vector2 {
    fn mul_assign(&mut self, rhs: Fixed) {
        *self = *self * rhs;
    }
}
