/// Directivity models of emitters.
pub mod directivity;

use directivity::Directivity;

use crate::{
    environment::Environment,
    excitation::Excitation,
    geometry::{Complex, Emitter, Point3},
};

/// Calculates the complex pressure that a unit excitation of `emitter` produces at `target`.
///
/// The model is `D(θ)·e^{i·k·d}/d`, where `d` is the distance, `k` the wavenumber and `D` the
/// directivity. Within `1/k` of the emitter the spreading term is held at its value at `d = 1/k`.
#[inline]
#[must_use]
pub fn propagate<D: Directivity>(emitter: &Emitter, env: &Environment, target: &Point3) -> Complex {
    let diff = target - emitter.position();
    let dist = diff.norm();
    let wavenumber = emitter.wavenumber(env);
    let r = D::gain_toward(&emitter.normal(), &diff) / dist.max(1. / wavenumber);
    Complex::from_polar(r, wavenumber * dist)
}

/// Re-simulates the complex field at `target` produced by `excitations`.
#[must_use]
pub fn field_at<'a, D: Directivity>(
    emitters: impl IntoIterator<Item = &'a Emitter>,
    excitations: &[Excitation],
    env: &Environment,
    target: &Point3,
) -> Complex {
    emitters
        .into_iter()
        .zip(excitations)
        .map(|(e, x)| x.to_complex() * propagate::<D>(e, env, target))
        .sum()
}
