#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Multi-focus beamforming and multiplexed drive for ultrasonic phased arrays.
//!
//! An [`ArraySession`] owns the emitter geometry and a [`Link`] to the hardware. Every focus
//! request is solved with [`IBP`], quantized, mapped to PWM timings, scheduled on the mux tree,
//! and pushed to the link as one [`Frame`]. The latest result stays readable through
//! [`ArraySession::snapshot`] and [`Inspector`] regardless of the link state.
//!
//! [`Link`]: sonic_core::link::Link
//! [`Frame`]: sonic_core::link::Frame
//! [`IBP`]: sonic_holo::IBP

/// Loading the startup configuration.
pub mod config;
/// Errors.
pub mod error;
/// [`Link`] implementations without hardware.
///
/// [`Link`]: sonic_core::link::Link
pub mod link;
/// Commonly used types.
pub mod prelude;
mod session;

pub use sonic_core as core;
pub use sonic_driver as driver;
pub use sonic_holo as holo;

pub use config::ArrayConfig;
pub use error::{ErrorKind, SonicError};
pub use session::{ArraySession, ArraySessionBuilder, Inspector, Snapshot};
