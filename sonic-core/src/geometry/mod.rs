mod emitter;
mod error;
mod grid;

/// a complex number
pub type Complex = nalgebra::Complex<f32>;
/// 3-dimensional column vector.
pub type Vector3 = nalgebra::Vector3<f32>;
/// 3-dimensional unit vector.
pub type UnitVector3 = nalgebra::UnitVector3<f32>;
/// 3-dimensional point.
pub type Point3 = nalgebra::Point3<f32>;
/// A unit quaternion.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f32>;
/// A 3-dimensional isometry.
pub type Isometry3 = nalgebra::Isometry3<f32>;
/// A 3-dimensional translation.
pub type Translation3 = nalgebra::Translation3<f32>;

pub use emitter::*;
pub use error::GeometryError;
pub use grid::*;

use crate::{common::Freq, environment::Environment};

/// The static geometry of an emitter array.
///
/// The array is built once and never mutated afterwards. All emitters share a single carrier
/// frequency because one PWM clock drives every channel.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterArray {
    emitters: Vec<Emitter>,
    env: Environment,
    carrier: Freq<f32>,
}

impl EmitterArray {
    /// Creates a new [`EmitterArray`] and assigns the emitter indices in order.
    pub fn new(emitters: Vec<Emitter>, env: Environment) -> Result<Self, GeometryError> {
        if !(env.sound_speed.is_finite() && env.sound_speed > 0.) {
            return Err(GeometryError::InvalidSoundSpeed(env.sound_speed));
        }
        let carrier = emitters
            .first()
            .map(|e| e.frequency())
            .ok_or(GeometryError::NoEmitter)?;
        let mut emitters = emitters;
        emitters.iter_mut().enumerate().try_for_each(|(idx, e)| {
            e.idx = idx;
            let p = e.position();
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(GeometryError::InvalidPosition(idx));
            }
            if !e.normal().iter().all(|v| v.is_finite()) {
                return Err(GeometryError::InvalidNormal(idx));
            }
            let f = e.frequency().hz();
            if !(f.is_finite() && f > 0.) {
                return Err(GeometryError::InvalidFrequency(idx));
            }
            if e.frequency() != carrier {
                return Err(GeometryError::MixedCarrier(idx, e.frequency(), carrier));
            }
            Ok(())
        })?;
        Ok(Self {
            emitters,
            env,
            carrier,
        })
    }

    /// Gets the number of emitters.
    #[must_use]
    pub fn num_emitters(&self) -> usize {
        self.emitters.len()
    }

    /// Gets the propagation environment.
    #[must_use]
    pub const fn env(&self) -> &Environment {
        &self.env
    }

    /// Gets the carrier frequency shared by all emitters.
    #[must_use]
    pub const fn carrier(&self) -> Freq<f32> {
        self.carrier
    }

    /// Gets the wavenumber of the carrier \[rad/m\].
    #[must_use]
    pub fn wavenumber(&self) -> f32 {
        2.0 * crate::common::PI * self.carrier.hz() / self.env.sound_speed
    }

    /// Gets the wavelength of the carrier \[m\].
    #[must_use]
    pub fn wavelength(&self) -> f32 {
        self.env.sound_speed / self.carrier.hz()
    }

    /// Gets the centroid of the emitters.
    #[must_use]
    pub fn center(&self) -> Point3 {
        Point3::from(
            self.emitters
                .iter()
                .map(|e| e.position().coords)
                .sum::<Vector3>()
                / self.emitters.len() as f32,
        )
    }
}

impl<'a> IntoIterator for &'a EmitterArray {
    type Item = &'a Emitter;
    type IntoIter = core::slice::Iter<'a, Emitter>;

    fn into_iter(self) -> Self::IntoIter {
        self.emitters.iter()
    }
}

impl core::ops::Deref for EmitterArray {
    type Target = [Emitter];

    fn deref(&self) -> &Self::Target {
        &self.emitters
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::common::{Hz, ULTRASOUND_FREQ, mm};

    use super::*;

    pub fn create_emitter(position: Point3) -> Emitter {
        Emitter::new(position, Vector3::z_axis(), ULTRASOUND_FREQ)
    }

    pub fn create_array(n: usize) -> EmitterArray {
        EmitterArray::new(
            (0..n)
                .map(|i| create_emitter(Point3::new(i as f32 * 10. * mm, 0., 0.)))
                .collect(),
            Environment::new(),
        )
        .unwrap()
    }

    #[rstest::rstest]
    #[case(1)]
    #[case(64)]
    fn num_emitters(#[case] n: usize) {
        let array = create_array(n);
        assert_eq!(n, array.num_emitters());
        array
            .iter()
            .enumerate()
            .for_each(|(i, e)| assert_eq!(i, e.idx()));
    }

    #[test]
    fn empty() {
        assert_eq!(
            Err(GeometryError::NoEmitter),
            EmitterArray::new(vec![], Environment::new())
        );
    }

    #[rstest::rstest]
    #[case(GeometryError::InvalidSoundSpeed(0.), 0.)]
    #[case(GeometryError::InvalidSoundSpeed(-1.), -1.)]
    fn invalid_sound_speed(#[case] expected: GeometryError, #[case] c: f32) {
        assert_eq!(
            Err(expected),
            EmitterArray::new(
                vec![create_emitter(Point3::origin())],
                Environment::with_sound_speed(c)
            )
        );
    }

    #[test]
    fn invalid_position() {
        assert_eq!(
            Err(GeometryError::InvalidPosition(1)),
            EmitterArray::new(
                vec![
                    create_emitter(Point3::origin()),
                    create_emitter(Point3::new(f32::NAN, 0., 0.))
                ],
                Environment::new()
            )
        );
    }

    #[rstest::rstest]
    #[case(Vector3::new(f32::NAN, 0., 0.))]
    #[case(Vector3::new(0., f32::INFINITY, 0.))]
    fn invalid_normal(#[case] normal: Vector3) {
        assert_eq!(
            Err(GeometryError::InvalidNormal(1)),
            EmitterArray::new(
                vec![
                    create_emitter(Point3::origin()),
                    Emitter::new(
                        Point3::origin(),
                        UnitVector3::new_unchecked(normal),
                        ULTRASOUND_FREQ
                    )
                ],
                Environment::new()
            )
        );
    }

    #[rstest::rstest]
    #[case(GeometryError::InvalidFrequency(0), 0. * Hz)]
    #[case(GeometryError::InvalidFrequency(0), -40. * Hz)]
    fn invalid_frequency(#[case] expected: GeometryError, #[case] freq: Freq<f32>) {
        assert_eq!(
            Err(expected),
            EmitterArray::new(
                vec![Emitter::new(Point3::origin(), Vector3::z_axis(), freq)],
                Environment::new()
            )
        );
    }

    #[test]
    fn mixed_carrier() {
        assert_eq!(
            Err(GeometryError::MixedCarrier(1, 41e3 * Hz, 40e3 * Hz)),
            EmitterArray::new(
                vec![
                    create_emitter(Point3::origin()),
                    Emitter::new(Point3::origin(), Vector3::z_axis(), 41e3 * Hz)
                ],
                Environment::new()
            )
        );
    }

    #[test]
    fn center() {
        let array = create_array(3);
        approx::assert_abs_diff_eq!(10. * mm, array.center().x, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(0., array.center().y);
    }

    #[test]
    fn wave() {
        let array = create_array(1);
        approx::assert_abs_diff_eq!(8.5 * mm, array.wavelength(), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(739.198_3, array.wavenumber(), epsilon = 1e-2);
    }
}
