use super::*;

/// An omnidirectional emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sphere;

impl Directivity for Sphere {
    #[inline]
    fn gain(_: Angle) -> f32 {
        1.
    }

    #[inline]
    fn gain_toward(_: &UnitVector3, _: &Vector3) -> f32 {
        1.
    }
}
