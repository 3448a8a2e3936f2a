#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core types for driving an ultrasonic phased array.
//!
//! This crate holds everything the solver, driver and session layers share: units, the emitter
//! geometry, the per-emitter [`Excitation`], the acoustic propagation model, and the [`Link`]
//! seam through which timing tables reach the hardware.
//!
//! [`Excitation`]: crate::excitation::Excitation
//! [`Link`]: crate::link::Link

/// Utilities for acoustics.
pub mod acoustics;
/// Common constants and unit types.
pub mod common;
/// Propagation environment.
pub mod environment;
/// Per-emitter drive values.
pub mod excitation;
/// Geometry related modules.
pub mod geometry;
/// A interface to the hardware.
pub mod link;
