use std::{marker::PhantomData, num::NonZeroUsize};

use derive_more::Debug;
use getset::{CopyGetters, Getters};
use sonic_core::{
    acoustics::directivity::{Directivity, Sphere},
    common::rad,
    excitation::Excitation,
    geometry::{Complex, EmitterArray},
};

use crate::{
    VectorXc,
    error::HoloError,
    focus::{Foci, FocusPoint},
    helper::{gen_back_prop, generate_propagation_matrix},
};

/// Emitters below this amplitude do not take part in the convergence test.
const AMPLITUDE_EPS: f32 = 1e-6;

/// The option of [`IBP`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IBPOption {
    /// The maximum number of refinement passes.
    pub iterations: NonZeroUsize,
    /// The solver stops once the largest per-emitter phase change between two passes falls
    /// below this value \[rad\].
    pub convergence_tol: f32,
}

impl Default for IBPOption {
    fn default() -> Self {
        Self {
            iterations: NonZeroUsize::MIN.saturating_add(99),
            convergence_tol: 1e-4,
        }
    }
}

/// The result of [`IBP::solve`].
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct Solution {
    #[getset(get = "pub")]
    /// The excitation of each emitter, in array order. Amplitudes lie in `[0, 1]`.
    excitations: Vec<Excitation>,
    #[getset(get_copy = "pub")]
    /// The number of passes performed.
    iterations: usize,
    #[getset(get_copy = "pub")]
    /// The largest per-emitter phase change of the last pass \[rad\].
    max_phase_change: f32,
    #[getset(get_copy = "pub")]
    /// Whether the solver stopped because the phase change fell below the tolerance.
    converged: bool,
}

impl Solution {
    /// Consumes the solution and returns the excitations.
    #[must_use]
    pub fn into_excitations(self) -> Vec<Excitation> {
        self.excitations
    }
}

/// Multi-focus Iterative Backprojection.
///
/// Each pass predicts the field at every focus from the current excitations, compares it with
/// the requested weight, and backprojects the corrected focal fields onto the emitters through
/// the normalized conjugate transfer matrix. Per-focus gains are adapted multiplicatively so that
/// the reconstructed focal amplitudes follow the requested relative weights. Amplitudes are
/// renormalized by their maximum after every pass.
///
/// When every weight is real, the phase at each focus is left free. When any weight carries a
/// phase, the relative phases between foci are locked to the weights and only a common phase
/// is free.
///
/// No optimality is claimed for more than one focus: the solver returns its best effort after
/// the iteration budget.
#[derive(Debug)]
pub struct IBP<D: Directivity = Sphere> {
    /// The focal points.
    pub foci: Vec<FocusPoint>,
    /// The option of the solver.
    pub option: IBPOption,
    #[debug(ignore)]
    directivity: PhantomData<D>,
}

impl IBP<Sphere> {
    /// Create a new [`IBP`] with omnidirectional emitters.
    #[must_use]
    pub fn new(foci: impl IntoIterator<Item = FocusPoint>, option: IBPOption) -> Self {
        Self::with_directivity(foci, option)
    }
}

impl<D: Directivity> IBP<D> {
    /// Create a new [`IBP`] with directivity.
    #[must_use]
    pub fn with_directivity(
        foci: impl IntoIterator<Item = FocusPoint>,
        option: IBPOption,
    ) -> Self {
        Self {
            foci: foci.into_iter().collect(),
            option,
            directivity: PhantomData,
        }
    }

    /// Returns the closed-form single-focus solution for the dominant focus: unit amplitude and
    /// the phase `-k·d` that cancels the propagation delay to it.
    pub fn seed(&self, array: &EmitterArray) -> Result<Vec<Excitation>, HoloError> {
        let foci = Foci::new(&self.foci)?;
        let target = foci.foci[foci.dominant()].position;
        Ok(array
            .iter()
            .map(|e| Excitation::new(e.focus_phase(&target, array.env()) * rad, 1.))
            .collect())
    }

    /// Solves for the excitation of every emitter.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(foci = self.foci.len(), emitters = array.num_emitters())
    )]
    pub fn solve(&self, array: &EmitterArray) -> Result<Solution, HoloError> {
        let foci = Foci::new(&self.foci)?;
        let targets = foci.positions();

        let m = targets.len();
        let n = array.num_emitters();

        let g = generate_propagation_matrix::<D>(array, &targets);
        let b = gen_back_prop(n, m, &g);

        let amps = foci
            .foci
            .iter()
            .map(FocusPoint::amplitude)
            .collect::<Vec<_>>();
        let amps_norm = amps.iter().map(|a| a * a).sum::<f32>();

        let target = foci.foci[foci.dominant()].position;
        let mut q = VectorXc::from_iterator(
            n,
            array
                .iter()
                .map(|e| Complex::from_polar(1., e.focus_phase(&target, array.env()))),
        );
        let mut q_next = VectorXc::zeros(n);
        let mut p = VectorXc::zeros(m);
        let mut t = VectorXc::zeros(m);
        let mut gains = amps.clone();

        let mut iterations = 0;
        let mut max_phase_change = f32::INFINITY;
        let mut converged = false;
        for _ in 0..self.option.iterations.get() {
            iterations += 1;

            p.gemv(Complex::new(1., 0.), &g, &q, Complex::new(0., 0.));

            let scale = p
                .iter()
                .zip(amps.iter())
                .map(|(p, a)| p.norm() * a)
                .sum::<f32>()
                / amps_norm;
            let common_phase = if foci.phase_locked {
                p.iter()
                    .zip(foci.foci.iter())
                    .map(|(p, f)| f.weight.conj() * p)
                    .sum::<Complex>()
                    .arg()
            } else {
                0.
            };

            t.iter_mut()
                .zip(p.iter())
                .zip(gains.iter_mut())
                .zip(foci.foci.iter().zip(amps.iter()))
                .for_each(|(((t, p), gain), (f, &a))| {
                    let r = p.norm();
                    if a > 0. && r > 0. {
                        *gain *= a * scale / r;
                    }
                    let phase = if foci.phase_locked {
                        common_phase + f.weight.arg()
                    } else {
                        p.arg()
                    };
                    *t = Complex::from_polar(*gain, phase);
                });

            q_next.gemv(Complex::new(1., 0.), &b, &t, Complex::new(0., 0.));

            let max = q_next.iter().map(|x| x.norm()).fold(0., f32::max);
            if !(max > 0. && max.is_finite()) {
                tracing::warn!(iteration = iterations, "backprojection vanished");
                break;
            }
            q_next.iter_mut().for_each(|x| *x /= max);

            max_phase_change = q
                .iter()
                .zip(q_next.iter())
                .filter(|(a, b)| a.norm() > AMPLITUDE_EPS && b.norm() > AMPLITUDE_EPS)
                .map(|(a, b)| (b * a.conj()).arg().abs())
                .fold(0., f32::max);
            std::mem::swap(&mut q, &mut q_next);

            tracing::trace!(iteration = iterations, max_phase_change, scale);

            if max_phase_change < self.option.convergence_tol {
                converged = true;
                break;
            }
        }

        tracing::debug!(iterations, max_phase_change, converged, "IBP finished");

        Ok(Solution {
            excitations: q
                .iter()
                .map(|x| Excitation::new(x.arg() * rad, x.norm().min(1.)))
                .collect(),
            iterations,
            max_phase_change,
            converged,
        })
    }
}
