use thiserror::Error;

use crate::common::Freq;

/// An error produced while building an [`EmitterArray`].
///
/// [`EmitterArray`]: super::EmitterArray
#[derive(Error, Debug, PartialEq, Clone)]
pub enum GeometryError {
    /// The array contains no emitter.
    #[error("Array must contain at least one emitter")]
    NoEmitter,
    /// The emitter position contains a non-finite coordinate.
    #[error("Emitter ({0}) has a non-finite position")]
    InvalidPosition(usize),
    /// The emitter normal is zero-length or non-finite.
    #[error("Emitter ({0}) has a zero-length or non-finite normal")]
    InvalidNormal(usize),
    /// The emitter frequency is not positive.
    #[error("Emitter ({0}) has a non-positive carrier frequency")]
    InvalidFrequency(usize),
    /// The emitters do not share one carrier frequency.
    #[error("Emitter ({0}) runs at {1:?}, but the array carrier is {2:?}")]
    MixedCarrier(usize, Freq<f32>, Freq<f32>),
    /// The sound speed is not positive.
    #[error("Sound speed ({0}) must be positive")]
    InvalidSoundSpeed(f32),
}
