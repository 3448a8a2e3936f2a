use std::time::Duration;

use sonic_core::common::Freq;

use crate::error::DriverError;

/// Per-channel timing offsets compensating for the propagation delay of the mux tree, in carrier
/// cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct SkewCorrectionTable {
    offsets: Vec<f32>,
}

impl SkewCorrectionTable {
    /// Creates a new [`SkewCorrectionTable`] from offsets in carrier cycles.
    pub fn new(offsets: Vec<f32>) -> Result<Self, DriverError> {
        if let Some(i) = offsets.iter().position(|o| !o.is_finite()) {
            return Err(DriverError::InvalidSkew(i));
        }
        Ok(Self { offsets })
    }

    /// Creates a table without correction for `channels` channels.
    #[must_use]
    pub fn zeros(channels: usize) -> Self {
        Self {
            offsets: vec![0.; channels],
        }
    }

    /// Creates a table from measured delays.
    ///
    /// A channel whose signal arrives late by `delay` is advanced by `delay·f` cycles.
    #[must_use]
    pub fn from_delays(delays: &[Duration], carrier: Freq<f32>) -> Self {
        Self {
            offsets: delays
                .iter()
                .map(|d| -d.as_secs_f32() * carrier.hz())
                .collect(),
        }
    }

    /// Creates a table from measured delays in nanoseconds.
    pub fn from_delays_ns(delays_ns: &[f32], carrier: Freq<f32>) -> Result<Self, DriverError> {
        let delays = delays_ns
            .iter()
            .enumerate()
            .map(|(i, &ns)| {
                Duration::try_from_secs_f32(ns * 1e-9)
                    .map_err(|_| DriverError::InvalidDelay(i, ns))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_delays(&delays, carrier))
    }

    /// The offsets in carrier cycles.
    #[must_use]
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// The number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the table has no channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
