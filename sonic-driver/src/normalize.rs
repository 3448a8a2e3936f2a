use std::num::NonZeroU16;

use sonic_core::{
    common::{Angle, PI, rad},
    excitation::Excitation,
};

/// Maps excitations onto the phase and amplitude domain the hardware can represent.
///
/// Phases are rounded to the nearest of `steps` equally spaced values in `[0, 2π)`, ties to even,
/// and amplitudes are clamped into `[0, 1]`. Normalizing an already normalized excitation returns
/// it unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseNormalizer {
    steps: NonZeroU16,
}

impl PhaseNormalizer {
    /// The default phase resolution.
    pub const DEFAULT_STEPS: NonZeroU16 = NonZeroU16::MIN.saturating_add(255);

    /// Creates a new [`PhaseNormalizer`] with `steps` phase steps per cycle.
    #[must_use]
    pub const fn new(steps: NonZeroU16) -> Self {
        Self { steps }
    }

    /// The number of phase steps per cycle.
    #[must_use]
    pub const fn steps(&self) -> NonZeroU16 {
        self.steps
    }

    /// Gets the index of the phase step nearest to `phase`.
    #[must_use]
    pub fn step_of(&self, phase: Angle) -> u16 {
        let steps = self.steps.get() as f32;
        let step = phase.wrapped().radian() / (2.0 * PI) * steps;
        let step = step.round_ties_even() as u32;
        (step % self.steps.get() as u32) as u16
    }

    /// Gets the phase of the step `step`.
    #[must_use]
    pub fn phase_of(&self, step: u16) -> Angle {
        (step % self.steps.get()) as f32 * 2.0 * PI / self.steps.get() as f32 * rad
    }

    /// Normalizes a single excitation.
    #[must_use]
    pub fn normalize_one(&self, excitation: &Excitation) -> Excitation {
        Excitation::new(
            self.phase_of(self.step_of(excitation.phase())),
            excitation.amplitude().clamp(0., 1.),
        )
    }

    /// Normalizes every excitation.
    #[must_use]
    pub fn normalize(&self, excitations: &[Excitation]) -> Vec<Excitation> {
        excitations.iter().map(|e| self.normalize_one(e)).collect()
    }
}

impl Default for PhaseNormalizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[rstest::rstest]
    #[case(0, 0.)]
    #[case(128, PI)]
    #[case(255, PI * 510.0 / 256.0)]
    #[case(0, 2. * PI)]
    #[case(0, -PI / 256.)]
    #[case(255, -PI / 128.)]
    #[case(64, PI / 2.)]
    fn step_of(#[case] expected: u16, #[case] phase: f32) {
        assert_eq!(expected, PhaseNormalizer::default().step_of(phase * rad));
    }

    #[rstest::rstest]
    #[case(256, -PI / 256.)]
    #[case(1, PI)]
    fn tie_at_full_cycle_wraps_to_zero(#[case] steps: u16, #[case] phase: f32) {
        let normalizer = PhaseNormalizer::new(NonZeroU16::new(steps).unwrap());
        let step = normalizer.step_of(phase * rad);
        assert_eq!(0, step);
        assert_eq!(0., normalizer.phase_of(step).radian());
    }

    #[rstest::rstest]
    #[case(0, 2, PI / 2.)]
    #[case(2, 6, PI / 2.)]
    #[case(2, 10, PI / 2.)]
    #[case(2, 3, PI)]
    #[case(2, 5, PI)]
    #[case(4, 7, PI)]
    #[case(4, 9, PI)]
    fn ties_to_even(#[case] expected: u16, #[case] steps: u16, #[case] phase: f32) {
        let normalizer = PhaseNormalizer::new(NonZeroU16::new(steps).unwrap());
        assert_eq!(expected, normalizer.step_of(phase * rad));
    }

    #[rstest::rstest]
    #[case(1., 1.5)]
    #[case(0., -0.5)]
    #[case(0.25, 0.25)]
    #[case(0., f32::NAN)]
    fn clamps_amplitude(#[case] expected: f32, #[case] amplitude: f32) {
        let e = PhaseNormalizer::default()
            .normalize_one(&Excitation::new(0. * rad, amplitude));
        assert_eq!(expected, e.amplitude());
    }

    #[test]
    fn idempotent() {
        let mut rng = rand::rng();
        [PhaseNormalizer::default(), PhaseNormalizer::new(NonZeroU16::new(12).unwrap())]
            .iter()
            .for_each(|normalizer| {
                let excitations = (0..1000)
                    .map(|_| {
                        Excitation::new(
                            rng.random_range(-4. * PI..4. * PI) * rad,
                            rng.random_range(-0.5..1.5),
                        )
                    })
                    .collect::<Vec<_>>();
                let once = normalizer.normalize(&excitations);
                let twice = normalizer.normalize(&once);
                assert_eq!(once, twice);
            });
    }

    #[test]
    fn error_is_within_half_step() {
        let mut rng = rand::rng();
        let normalizer = PhaseNormalizer::default();
        (0..1000).for_each(|_| {
            let phase = rng.random_range(0.0..2. * PI);
            let normalized = normalizer.normalize_one(&Excitation::new(phase * rad, 1.));
            let diff = (normalized.phase().radian() - phase).abs();
            let diff = diff.min(2. * PI - diff);
            assert!(diff <= PI / 256. + 1e-5, "{phase}: {diff}");
        });
    }
}
