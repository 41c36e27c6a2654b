use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::Vec3;

/// A scalar angle stored in degrees.
///
/// The stored value is never normalized implicitly: arithmetic may leave it
/// outside `[0, 360)` until [`clamp`](Self::clamp) is called. Equality and
/// ordering compare the raw stored degrees, so `Angle::from_degrees(360.0)`
/// is not equal to `Angle::ZERO` until clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Angle {
    degrees: f32,
}

impl Angle {
    pub const ZERO: Self = Self { degrees: 0.0 };
    pub const RIGHT: Self = Self { degrees: 90.0 };
    pub const STRAIGHT: Self = Self { degrees: 180.0 };

    #[inline]
    #[must_use]
    pub const fn from_degrees(degrees: f32) -> Self {
        Self { degrees }
    }

    #[inline]
    #[must_use]
    pub fn from_radians(radians: f32) -> Self {
        Self {
            degrees: radians.to_degrees(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn degrees(self) -> f32 {
        self.degrees
    }

    #[inline]
    #[must_use]
    pub fn radians(self) -> f32 {
        self.degrees.to_radians()
    }

    /// Normalizes the stored value into `[0, 360)` in place.
    pub fn clamp(&mut self) {
        self.degrees = normalize_degrees(self.degrees);
    }

    /// Returns a copy normalized into `[0, 360)`.
    #[inline]
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            degrees: normalize_degrees(self.degrees),
        }
    }

    #[inline]
    #[must_use]
    pub fn sin(self) -> f32 {
        self.radians().sin()
    }

    #[inline]
    #[must_use]
    pub fn cos(self) -> f32 {
        self.radians().cos()
    }

    /// Shortest signed difference `to - from`, in `(-180, 180]`.
    #[must_use]
    pub fn diff(from: Self, to: Self) -> Self {
        let mut d = normalize_degrees(to.degrees - from.degrees);
        if d > 180.0 {
            d -= 360.0;
        }
        Self { degrees: d }
    }

    /// Interpolates along the shortest arc. `t` is not clamped.
    #[must_use]
    pub fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + Self::diff(from, to) * t
    }

    /// Unsigned angle between two directions, in `[0, 180]`.
    ///
    /// Returns [`Angle::ZERO`] when either vector has zero length.
    #[must_use]
    pub fn between(a: Vec3, b: Vec3) -> Self {
        let (la, lb) = (a.length_squared(), b.length_squared());
        if la <= f32::MIN_POSITIVE || lb <= f32::MIN_POSITIVE {
            return Self::ZERO;
        }
        let cos = (a.dot(b) / (la.sqrt() * lb.sqrt())).clamp(-1.0, 1.0);
        Self::from_radians(cos.acos())
    }
}

fn normalize_degrees(degrees: f32) -> f32 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

impl Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_degrees(self.degrees + rhs.degrees)
    }
}

impl Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_degrees(self.degrees - rhs.degrees)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        self.degrees += rhs.degrees;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Self) {
        self.degrees -= rhs.degrees;
    }
}

impl Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_degrees(-self.degrees)
    }
}

impl Mul<f32> for Angle {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::from_degrees(self.degrees * rhs)
    }
}

impl Div<f32> for Angle {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::from_degrees(self.degrees / rhs)
    }
}
