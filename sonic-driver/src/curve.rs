use std::num::NonZeroUsize;

use itertools::Itertools;
use sonic_core::common::PI;

use crate::error::DriverError;

/// The amplitude-to-duty-cycle response of the emitter drive, as a piecewise-linear table.
///
/// The table maps a normalized amplitude in `[0, 1]` to the duty cycle of the square carrier that
/// produces it. Both columns are strictly increasing, so the curve can be inverted exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct DutyCycleCurve {
    points: Vec<(f32, f32)>,
}

impl DutyCycleCurve {
    /// The largest duty cycle a curve may reach.
    pub const MAX_DUTY: f32 = 0.5;

    /// Creates a new [`DutyCycleCurve`] from `(amplitude, duty)` pairs.
    ///
    /// The table must have at least two points, start at amplitude 0, end at amplitude 1, and both
    /// amplitudes and duties must be strictly increasing with duties in `[0, 0.5]`.
    pub fn new(points: Vec<(f32, f32)>) -> Result<Self, DriverError> {
        if points.len() < 2 {
            return Err(DriverError::InvalidCurve(format!(
                "at least 2 points are required, but got {}",
                points.len()
            )));
        }
        if let Some(&(a, d)) = points
            .iter()
            .find(|(a, d)| !(a.is_finite() && d.is_finite()))
        {
            return Err(DriverError::InvalidCurve(format!(
                "point ({a}, {d}) is not finite"
            )));
        }
        let (first, _) = points[0];
        let (last, _) = points[points.len() - 1];
        if first != 0. || last != 1. {
            return Err(DriverError::InvalidCurve(format!(
                "amplitudes must span [0, 1], but span [{first}, {last}]"
            )));
        }
        if let Some(&(_, d)) = points
            .iter()
            .find(|(_, d)| !(0.0..=Self::MAX_DUTY).contains(d))
        {
            return Err(DriverError::InvalidCurve(format!(
                "duty {d} is out of range [0, {}]",
                Self::MAX_DUTY
            )));
        }
        if let Some(((a0, d0), (a1, d1))) = points
            .iter()
            .tuple_windows()
            .find(|((a0, d0), (a1, d1))| a1 <= a0 || d1 <= d0)
        {
            return Err(DriverError::InvalidCurve(format!(
                "points ({a0}, {d0}) and ({a1}, {d1}) are not strictly increasing"
            )));
        }
        Ok(Self { points })
    }

    /// The ideal response of a square carrier whose fundamental is proportional to
    /// `sin(π·duty)`, sampled at `segments + 1` evenly spaced amplitudes.
    #[must_use]
    pub fn arcsine(segments: NonZeroUsize) -> Self {
        let n = segments.get();
        Self {
            points: (0..=n)
                .map(|i| {
                    let a = i as f32 / n as f32;
                    (a, a.asin() / PI)
                })
                .collect(),
        }
    }

    /// The `(amplitude, duty)` points of the table.
    #[must_use]
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Gets the duty cycle for `amplitude`. The input is clamped into `[0, 1]`.
    #[must_use]
    pub fn duty(&self, amplitude: f32) -> f32 {
        let a = if amplitude.is_nan() {
            0.
        } else {
            amplitude.clamp(0., 1.)
        };
        Self::interpolate(self.points.iter().copied(), a)
    }

    /// Gets the amplitude for `duty`, the inverse of [`duty`]. The input is clamped into the
    /// duty range of the table.
    ///
    /// [`duty`]: Self::duty
    #[must_use]
    pub fn amplitude(&self, duty: f32) -> f32 {
        let lo = self.points[0].1;
        let hi = self.points[self.points.len() - 1].1;
        let d = if duty.is_nan() { lo } else { duty.clamp(lo, hi) };
        Self::interpolate(self.points.iter().map(|&(a, d)| (d, a)), d)
    }

    fn interpolate(points: impl Iterator<Item = (f32, f32)>, x: f32) -> f32 {
        points
            .tuple_windows()
            .find(|&(_, (x1, _))| x <= x1)
            .map(|((x0, y0), (x1, y1))| y0 + (x - x0) / (x1 - x0) * (y1 - y0))
            .unwrap_or(0.)
    }
}

impl Default for DutyCycleCurve {
    fn default() -> Self {
        Self::arcsine(NonZeroUsize::MIN.saturating_add(255))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn arcsine_endpoints() {
        let curve = DutyCycleCurve::default();
        assert_eq!(257, curve.points().len());
        assert_eq!(0., curve.duty(0.));
        approx::assert_abs_diff_eq!(0.5, curve.duty(1.), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(1. / 6., curve.duty(0.5), epsilon = 1e-6);
    }

    #[rstest::rstest]
    #[case(0., -1.)]
    #[case(0., f32::NAN)]
    #[case(0.5, 2.)]
    fn duty_clamps(#[case] expected: f32, #[case] amplitude: f32) {
        approx::assert_abs_diff_eq!(
            expected,
            DutyCycleCurve::default().duty(amplitude),
            epsilon = 1e-6
        );
    }

    #[test]
    fn linear() -> anyhow::Result<()> {
        let curve = DutyCycleCurve::new(vec![(0., 0.), (0.5, 0.1), (1., 0.5)])?;
        approx::assert_abs_diff_eq!(0.05, curve.duty(0.25), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(0.3, curve.duty(0.75), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(0.75, curve.amplitude(0.3), epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let mut rng = rand::rng();
        let curves = [
            DutyCycleCurve::default(),
            DutyCycleCurve::arcsine(NonZeroUsize::new(8).unwrap()),
            DutyCycleCurve::new(vec![(0., 0.01), (0.2, 0.02), (0.7, 0.3), (1., 0.45)])?,
        ];
        curves.iter().for_each(|curve| {
            (0..1000).for_each(|_| {
                let a = rng.random_range(0.0..=1.0);
                approx::assert_abs_diff_eq!(a, curve.amplitude(curve.duty(a)), epsilon = 1e-4);
            });
        });
        Ok(())
    }

    #[rstest::rstest]
    #[case(vec![(0., 0.)])]
    #[case(vec![(0.1, 0.), (1., 0.5)])]
    #[case(vec![(0., 0.), (0.9, 0.5)])]
    #[case(vec![(0., 0.), (1., 0.6)])]
    #[case(vec![(0., -0.1), (1., 0.5)])]
    #[case(vec![(0., 0.), (0.5, 0.3), (0.5, 0.4), (1., 0.5)])]
    #[case(vec![(0., 0.), (0.5, 0.3), (0.7, 0.3), (1., 0.5)])]
    #[case(vec![(0., 0.), (0.5, f32::NAN), (1., 0.5)])]
    fn invalid(#[case] points: Vec<(f32, f32)>) {
        assert!(matches!(
            DutyCycleCurve::new(points),
            Err(DriverError::InvalidCurve(_))
        ));
    }
}
