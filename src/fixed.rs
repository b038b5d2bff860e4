//! 16.16 fixed-point numbers
//!
//! Every physics quantity (position, velocity, force, mass, angle) is stored
//! as a [`Fixed`] so that replaying the same inputs produces bit-identical
//! state on every platform. Floats appear only when converting in or out and
//! inside the trigonometric fallbacks.
//!
//! Arithmetic saturates at the `i32` range instead of wrapping. Values beyond
//! roughly ±32767 are out of range and callers must keep magnitudes below it.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional bits
pub const FRACTION_BITS: u32 = 16;
/// Raw value of 1.0
pub const SCALE: i32 = 1 << FRACTION_BITS;
/// Newton-Raphson refinements performed by [`Fixed::sqrt`]
pub const SQRT_ITERATIONS: u32 = 8;

/// A signed 16.16 fixed-point value
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);
    pub const HALF: Fixed = Fixed(SCALE / 2);
    /// Smallest positive value, substituted for zero divisors
    pub const EPSILON: Fixed = Fixed(1);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);
    pub const PI: Fixed = Fixed(205_887);
    pub const TAU: Fixed = Fixed(411_775);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(n: i32) -> Self {
        Fixed(n.saturating_mul(SCALE))
    }

    /// Lossy conversion, rounded to the nearest representable value
    pub fn from_f64(value: f64) -> Self {
        // `as` saturates on overflow and maps NaN to zero
        Self::saturate((value * SCALE as f64).round() as i64)
    }

    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Presentation-boundary conversion
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    #[inline]
    fn saturate(wide: i64) -> Self {
        Fixed(wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Double-width product shifted back down by the fraction bits
    #[inline]
    pub fn multiply(self, rhs: Fixed) -> Fixed {
        Self::saturate((self.0 as i64 * rhs.0 as i64) >> FRACTION_BITS)
    }

    /// Quotient computed from the dividend shifted up 32 bits, then shifted
    /// down 16. A zero divisor is replaced with [`Fixed::EPSILON`].
    pub fn divide(self, rhs: Fixed) -> Fixed {
        let divisor = if rhs.0 == 0 { Self::EPSILON.0 } else { rhs.0 };
        let wide = ((self.0 as i64) << 32)
            .checked_div(divisor as i64)
            .unwrap_or(i64::MAX);
        Self::saturate(wide >> FRACTION_BITS)
    }

    /// Square root by a fixed number of Newton-Raphson steps, seeded from
    /// `(n + 1) / 2`. Bounded time, not converged to the last bit for large
    /// inputs. Non-positive inputs return zero.
    pub fn sqrt(self) -> Fixed {
        if self.0 <= 0 {
            return Fixed::ZERO;
        }
        let mut x = Fixed(((self.0 as i64 + SCALE as i64) >> 1) as i32);
        for _ in 0..SQRT_ITERATIONS {
            if x.0 == 0 {
                break;
            }
            let next = (x.0 as i64 + self.divide(x).0 as i64) >> 1;
            x = Self::saturate(next);
        }
        x
    }

    #[inline]
    pub fn abs(self) -> Fixed {
        if self.0 < 0 {
            Fixed(self.0.saturating_neg())
        } else {
            self
        }
    }

    /// Round half away from zero to the nearest whole number
    pub fn round(self) -> Fixed {
        if self.0 < 0 {
            -Fixed(self.0.saturating_neg()).round()
        } else {
            Fixed(self.0.saturating_add(Self::HALF.0) & !(SCALE - 1))
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    // Trig is off the hot path, so it goes through f64.

    pub fn sin(self) -> Fixed {
        Fixed::from_f64(self.to_f64().sin())
    }

    pub fn cos(self) -> Fixed {
        Fixed::from_f64(self.to_f64().cos())
    }

    pub fn atan2(y: Fixed, x: Fixed) -> Fixed {
        Fixed::from_f64(y.to_f64().atan2(x.to_f64()))
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        self.multiply(rhs)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, rhs: Fixed) -> Fixed {
        self.divide(rhs)
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fixed {
    fn mul_assign(&mut self, rhs: Fixed) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fixed {
    fn div_assign(&mut self, rhs: Fixed) {
        *self = *self / rhs;
    }
}

// Table and config files carry plain decimal numbers; every 16.16 value is
// exactly representable as an f64 so this is lossless in both directions.
impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Fixed::from_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ULP: f64 = 1.0 / SCALE as f64;

    #[test]
    fn test_constants() {
        assert_eq!(Fixed::ONE.to_f64(), 1.0);
        assert!((Fixed::PI.to_f64() - std::f64::consts::PI).abs() < ULP);
        assert!((Fixed::TAU.to_f64() - std::f64::consts::TAU).abs() < ULP);
        assert_eq!(Fixed::from_int(-3).to_f64(), -3.0);
    }

    #[test]
    fn test_multiply_and_divide() {
        let a = Fixed::from_f64(2.5);
        let b = Fixed::from_f64(-4.0);
        assert_eq!((a * b).to_f64(), -10.0);
        assert!(((b / a).to_f64() + 1.6).abs() <= 2.0 * ULP);
    }

    #[test]
    fn test_divide_by_zero_substitutes_epsilon() {
        let q = Fixed::ONE / Fixed::ZERO;
        assert_eq!(q, Fixed::MAX);
        let q = -Fixed::ONE / Fixed::ZERO;
        assert_eq!(q, Fixed::MIN);
        assert_eq!(Fixed::ZERO / Fixed::ZERO, Fixed::ZERO);
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(Fixed::ZERO.sqrt(), Fixed::ZERO);
        assert_eq!(Fixed::from_int(-4).sqrt(), Fixed::ZERO);
        assert!((Fixed::from_int(4).sqrt().to_f64() - 2.0).abs() < 0.001);
        assert!((Fixed::from_int(2500).sqrt().to_f64() - 50.0).abs() < 0.001);
        assert!((Fixed::from_f64(0.01).sqrt().to_f64() - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_sqrt_is_bounded_not_exact_for_large_inputs() {
        // Eight iterations from a far-off seed land close but above the root
        let root = Fixed::from_int(32_000).sqrt().to_f64();
        assert!(root >= 32_000f64.sqrt());
        assert!(root < 32_000f64.sqrt() * 1.01);
    }

    #[test]
    fn test_abs_and_round() {
        assert_eq!(Fixed::from_f64(-1.25).abs().to_f64(), 1.25);
        assert_eq!(Fixed::MIN.abs(), Fixed::MAX);
        assert_eq!(Fixed::from_f64(1.5).round().to_f64(), 2.0);
        assert_eq!(Fixed::from_f64(1.49).round().to_f64(), 1.0);
        assert_eq!(Fixed::from_f64(-1.5).round().to_f64(), -2.0);
        assert_eq!(Fixed::from_f64(-1.49).round().to_f64(), -1.0);
    }

    #[test]
    fn test_saturating_add() {
        assert_eq!(Fixed::MAX + Fixed::ONE, Fixed::MAX);
        assert_eq!(Fixed::MIN - Fixed::ONE, Fixed::MIN);
    }

    #[test]
    fn test_trig_fallback() {
        let half_pi = Fixed::PI / Fixed::from_int(2);
        assert!((half_pi.sin().to_f64() - 1.0).abs() < 0.001);
        assert!(half_pi.cos().to_f64().abs() < 0.001);
        let angle = Fixed::atan2(Fixed::ONE, Fixed::ZERO);
        assert!((angle.to_f64() - std::f64::consts::FRAC_PI_2).abs() < 0.001);
    }

    #[test]
    fn test_serde_as_decimal() {
        let value = Fixed::from_f64(12.75);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "12.75");
        let back: Fixed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    proptest! {
        #[test]
        fn prop_float_round_trip(x in -32767.0f64..32767.0) {
            let back = Fixed::from_f64(x).to_f64();
            prop_assert!((back - x).abs() <= ULP);
        }

        #[test]
        fn prop_multiply_undoes_divide(
            a in -1000.0f64..1000.0,
            b in 0.5f64..100.0,
            negate in any::<bool>(),
        ) {
            let a = Fixed::from_f64(a);
            let b = Fixed::from_f64(if negate { -b } else { b });
            let back = (a / b) * b;
            let tolerance = (b.abs().to_f64() * 2.0 + 2.0) * ULP;
            prop_assert!((back.to_f64() - a.to_f64()).abs() <= tolerance);
        }
    }
}
