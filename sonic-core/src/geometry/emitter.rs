use std::time::Duration;

use getset::CopyGetters;

use super::{Point3, UnitVector3};
use crate::{
    common::{Freq, PI},
    environment::Environment,
};

/// An ultrasonic emitter.
#[derive(Clone, Debug, PartialEq, CopyGetters)]
pub struct Emitter {
    pub(crate) idx: usize,
    #[getset(get_copy = "pub")]
    /// The position of the emitter.
    position: Point3,
    #[getset(get_copy = "pub")]
    /// The axial direction of the emitter.
    normal: UnitVector3,
    #[getset(get_copy = "pub")]
    /// The carrier frequency of the emitter.
    frequency: Freq<f32>,
}

impl Emitter {
    /// Creates a new [`Emitter`].
    ///
    /// The index is assigned when the emitter is placed into an [`EmitterArray`].
    ///
    /// [`EmitterArray`]: super::EmitterArray
    #[must_use]
    pub const fn new(position: Point3, normal: UnitVector3, frequency: Freq<f32>) -> Self {
        Self {
            idx: 0,
            position,
            normal,
            frequency,
        }
    }

    /// Gets the index of the emitter in the array.
    #[must_use]
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Gets the wavenumber \[rad/m\] in the given environment.
    #[must_use]
    pub fn wavenumber(&self, env: &Environment) -> f32 {
        2.0 * PI * self.frequency.hz() / env.sound_speed
    }

    /// Gets the wavelength \[m\] in the given environment.
    #[must_use]
    pub fn wavelength(&self, env: &Environment) -> f32 {
        env.sound_speed / self.frequency.hz()
    }

    /// Gets the distance to `target`.
    #[must_use]
    pub fn distance(&self, target: &Point3) -> f32 {
        (target - self.position).norm()
    }

    /// Gets the cosine of the angle between the normal and the direction to `target`.
    ///
    /// Returns 1 when `target` coincides with the emitter.
    #[must_use]
    pub fn direction_cosine(&self, target: &Point3) -> f32 {
        let diff = target - self.position;
        let dist = diff.norm();
        if dist == 0. {
            return 1.;
        }
        self.normal.dot(&diff) / dist
    }

    /// Gets the time the wavefront takes to travel to `target`.
    #[must_use]
    pub fn propagation_delay(&self, target: &Point3, env: &Environment) -> Duration {
        Duration::from_secs_f32(self.distance(target) / env.sound_speed)
    }

    /// Gets the phase \[rad\] that cancels the propagation delay to `target`, i.e. `-k·d`.
    #[must_use]
    pub fn focus_phase(&self, target: &Point3, env: &Environment) -> f32 {
        -self.wavenumber(env) * self.distance(target)
    }
}
