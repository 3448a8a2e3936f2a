use derive_more::Debug;

use crate::{
    common::{Angle, rad},
    geometry::Complex,
};

/// The drive value of a single emitter: a phase in `[0, 2π)` and a non-negative amplitude.
///
/// Internally this is the polar form of the complex excitation `amplitude·e^{i·phase}`.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[debug("Excitation {{ phase: {}rad, amplitude: {} }}", phase, amplitude)]
pub struct Excitation {
    phase: f32,
    amplitude: f32,
}

impl Excitation {
    /// A silent emitter.
    pub const NULL: Self = Self {
        phase: 0.,
        amplitude: 0.,
    };

    /// Creates a new [`Excitation`].
    ///
    /// The phase is wrapped into `[0, 2π)`. Negative or NaN amplitudes are mapped to zero.
    #[must_use]
    pub fn new(phase: Angle, amplitude: f32) -> Self {
        Self {
            phase: phase.wrapped().radian(),
            amplitude: if amplitude.is_nan() {
                0.
            } else {
                amplitude.max(0.)
            },
        }
    }

    /// Creates a new [`Excitation`] from its complex representation.
    #[must_use]
    pub fn from_complex(v: Complex) -> Self {
        Self::new(v.arg() * rad, v.norm())
    }

    /// Gets the phase.
    #[must_use]
    pub const fn phase(&self) -> Angle {
        Angle::from_radian(self.phase)
    }

    /// Gets the amplitude.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Gets the complex representation `amplitude·e^{i·phase}`.
    #[must_use]
    pub fn to_complex(&self) -> Complex {
        Complex::from_polar(self.amplitude, self.phase)
    }
}

impl From<Complex> for Excitation {
    fn from(v: Complex) -> Self {
        Self::from_complex(v)
    }
}
