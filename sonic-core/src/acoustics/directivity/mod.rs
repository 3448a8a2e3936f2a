mod sphere;
mod t4010a1;

use crate::{
    common::{Angle, rad},
    geometry::{UnitVector3, Vector3},
};

pub use sphere::Sphere;
pub use t4010a1::T4010A1;

/// The angular response of an emitter.
///
/// Implementors are zero-sized markers selected at compile time, so the solver can be
/// monomorphized per model.
pub trait Directivity: Send + Sync {
    /// The relative pressure amplitude radiated at `theta` off the emitter axis. `1` on axis.
    #[must_use]
    fn gain(theta: Angle) -> f32;

    /// The gain toward `direction` of an emitter facing `normal`.
    ///
    /// A zero-length `direction` is treated as on axis.
    #[must_use]
    fn gain_toward(normal: &UnitVector3, direction: &Vector3) -> f32 {
        let sin = normal.cross(direction).norm();
        let cos = normal.dot(direction);
        Self::gain(sin.atan2(cos) * rad)
    }
}
