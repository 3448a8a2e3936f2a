use sonic_core::geometry::Complex;
use thiserror::Error;

/// An error produced while solving for a focus request.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum HoloError {
    /// The request contains no focus.
    #[error("At least one focus is required")]
    NoFocus,
    /// The focus position contains a non-finite coordinate.
    #[error("Focus ({0}) has a non-finite position")]
    InvalidFocus(usize),
    /// The weight is not finite, or is real and negative.
    #[error("Focus ({0}) has an invalid weight ({1})")]
    InvalidWeight(usize, Complex),
    /// Every focus has zero weight.
    #[error("At least one focus must have a non-zero weight")]
    ZeroWeight,
}
