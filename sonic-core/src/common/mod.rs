mod angle;
mod freq;

pub use std::f32::consts::PI;

pub use angle::*;
pub use freq::*;

/// meter
pub const METER: f32 = 1.0;

/// millimeter
pub const MILLIMETER: f32 = METER / 1000.0;

/// \[㎜\]
#[allow(non_upper_case_globals)]
pub const mm: f32 = MILLIMETER;

/// The default carrier frequency of the emitters.
pub const ULTRASOUND_FREQ: Freq<f32> = Freq { freq: 40e3 };

/// The default speed of sound in air \[m/s\]
pub const DEFAULT_SOUND_SPEED: f32 = 340.0 * METER;
