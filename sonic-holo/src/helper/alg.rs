use crate::{MatrixXc, RowVectorXc};

use sonic_core::{
    acoustics::{directivity::Directivity, propagate},
    geometry::{EmitterArray, Point3},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

macro_rules! par_map {
    ($dst:expr, $iter:expr, $f:expr) => {
        #[cfg(feature = "parallel")]
        {
            $dst = $iter.par_iter().map($f).collect::<Vec<_>>();
        }
        #[cfg(not(feature = "parallel"))]
        {
            $dst = $iter.iter().map($f).collect::<Vec<_>>();
        }
    };
}

/// Builds the `foci × emitters` transfer matrix `G[j, i] = propagate(emitter_i, focus_j)`.
pub(crate) fn generate_propagation_matrix<D: Directivity>(
    array: &EmitterArray,
    foci: &[Point3],
) -> MatrixXc {
    let n = array.num_emitters();
    let env = array.env();
    let rows;
    par_map!(rows, foci, |f| {
        RowVectorXc::from_iterator(n, array.iter().map(|e| propagate::<D>(e, env, f)))
    });
    MatrixXc::from_rows(&rows)
}

/// Builds the `emitters × foci` back-propagation matrix
/// `B[i, j] = conj(G[j, i]) / Σ_i' |G[j, i']|²`.
pub(crate) fn gen_back_prop(emitters: usize, foci: usize, transfer: &MatrixXc) -> MatrixXc {
    MatrixXc::from_vec(
        emitters,
        foci,
        (0..foci)
            .flat_map(|j| {
                let norm = transfer
                    .row(j)
                    .iter()
                    .map(|x| x.norm_sqr())
                    .sum::<f32>();
                let x = if norm > 0. { 1.0 / norm } else { 0. };
                (0..emitters).map(move |i| transfer[(j, i)].conj() * x)
            })
            .collect::<Vec<_>>(),
    )
}
