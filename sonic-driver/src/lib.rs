#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! This crate turns per-emitter excitations into the timing table the array hardware consumes.
//!
//! The chain is [`PhaseNormalizer`] → [`PhaseToTimingMapper`] → [`MuxScheduler`], bundled in
//! [`DriveConfig`].

mod curve;
mod drive;
mod error;
mod mux;
mod normalize;
mod skew;
mod timing;

pub use curve::DutyCycleCurve;
pub use drive::{Drive, DriveConfig};
pub use error::DriverError;
pub use mux::{MuxBank, MuxConfig, MuxScheduler, MuxTable, TimingDescriptor};
pub use normalize::PhaseNormalizer;
pub use skew::SkewCorrectionTable;
pub use timing::{ChannelTiming, PhaseToTimingMapper, PwmConfig};
