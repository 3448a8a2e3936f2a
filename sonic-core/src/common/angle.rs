use derive_more::Debug;

use super::PI;

/// \[°\]
#[allow(non_camel_case_types)]
pub struct deg;

/// \[rad\]
#[allow(non_camel_case_types)]
pub struct rad;

/// Angle
#[repr(C)]
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
#[debug("{}rad", radian)]
pub struct Angle {
    radian: f32,
}

impl Angle {
    /// An angle of zero
    pub const ZERO: Self = Self { radian: 0.0 };

    /// An angle of π
    pub const PI: Self = Self { radian: PI };

    /// Creates an angle from radian
    #[must_use]
    pub const fn from_radian(radian: f32) -> Self {
        Self { radian }
    }

    /// Returns the angle in radian
    #[must_use]
    pub const fn radian(self) -> f32 {
        self.radian
    }

    /// Returns the angle in degree
    #[must_use]
    pub const fn degree(self) -> f32 {
        self.radian.to_degrees()
    }

    /// Returns the angle wrapped into `[0, 2π)`.
    ///
    /// Non-finite angles are mapped to zero.
    #[must_use]
    pub fn wrapped(self) -> Self {
        if !self.radian.is_finite() {
            return Self::ZERO;
        }
        let r = self.radian.rem_euclid(2.0 * PI);
        // rem_euclid may round up to exactly 2π for tiny negative inputs
        Self {
            radian: if r >= 2.0 * PI { 0.0 } else { r },
        }
    }
}

impl std::ops::Mul<deg> for f32 {
    type Output = Angle;

    fn mul(self, _rhs: deg) -> Self::Output {
        Self::Output {
            radian: self.to_radians(),
        }
    }
}

impl std::ops::Mul<rad> for f32 {
    type Output = Angle;

    fn mul(self, _rhs: rad) -> Self::Output {
        Self::Output { radian: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbg() {
        assert_eq!(format!("{:?}", 1.0 * rad), "1rad");
    }

    #[rstest::rstest]
    #[case(0.0, 0.0)]
    #[case(PI, PI)]
    #[case(PI, -PI)]
    #[case(0.0, 2.0 * PI)]
    #[case(0.5, 4.0 * PI + 0.5)]
    #[case(0.0, f32::NAN)]
    #[case(0.0, f32::INFINITY)]
    fn wrapped(#[case] expected: f32, #[case] radian: f32) {
        approx::assert_abs_diff_eq!(expected, (radian * rad).wrapped().radian(), epsilon = 1e-5);
    }

    #[test]
    fn wrapped_tiny_negative_stays_below_two_pi() {
        let a = (-1e-9 * rad).wrapped();
        assert!(a.radian() < 2.0 * PI);
        assert!(a.radian() >= 0.0);
    }

    #[test]
    fn degree() {
        approx::assert_abs_diff_eq!(PI, (180.0 * deg).radian(), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(90.0, (PI / 2.0 * rad).degree(), epsilon = 1e-4);
    }
}
