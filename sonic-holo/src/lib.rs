#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! This crate provides [`IBP`], a solver that computes emitter excitations producing multiple
//! focal points with independently specified relative weights.

pub(crate) mod math {
    use nalgebra::{Dyn, U1, VecStorage};
    use sonic_core::geometry::Complex;

    pub(crate) type MatrixXc = nalgebra::Matrix<Complex, Dyn, Dyn, VecStorage<Complex, Dyn, Dyn>>;
    pub(crate) type VectorXc = nalgebra::Matrix<Complex, Dyn, U1, VecStorage<Complex, Dyn, U1>>;
    pub(crate) type RowVectorXc = nalgebra::Matrix<Complex, U1, Dyn, VecStorage<Complex, U1, Dyn>>;
}

pub(crate) use math::*;

mod error;
mod focus;
mod helper;
mod ibp;

pub use error::HoloError;
pub use focus::FocusPoint;
pub use ibp::{IBP, IBPOption, Solution};
pub use sonic_core::acoustics::directivity::{Directivity, Sphere, T4010A1};
