use getset::Getters;
use sonic_core::{common::Freq, excitation::Excitation};

use crate::{
    error::DriverError,
    mux::{MuxScheduler, MuxTable},
    normalize::PhaseNormalizer,
    timing::PhaseToTimingMapper,
};

/// Everything needed to turn solver output into a timing table.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveConfig {
    /// Quantizes phases and clamps amplitudes.
    pub normalizer: PhaseNormalizer,
    /// Converts excitations into carrier timings.
    pub mapper: PhaseToTimingMapper,
    /// Builds the mux select sequence.
    pub scheduler: MuxScheduler,
}

/// The output of [`DriveConfig::drive`].
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Drive {
    /// The excitations after normalization.
    normalized: Vec<Excitation>,
    /// The scheduled timing table.
    table: MuxTable,
}

impl Drive {
    /// Consumes the drive and returns its parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Excitation>, MuxTable) {
        (self.normalized, self.table)
    }
}

impl DriveConfig {
    /// Creates a configuration with hardware defaults and no skew correction for `channels`
    /// channels.
    #[must_use]
    pub fn new(channels: usize) -> Self {
        Self {
            normalizer: PhaseNormalizer::default(),
            mapper: PhaseToTimingMapper::uncorrected(channels),
            scheduler: MuxScheduler::default(),
        }
    }

    /// The number of channels the configuration is built for.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.mapper.num_channels()
    }

    /// Normalizes, maps and schedules `excitations` on a carrier of frequency `carrier`.
    pub fn drive(
        &self,
        excitations: &[Excitation],
        carrier: Freq<f32>,
    ) -> Result<Drive, DriverError> {
        let normalized = self.normalizer.normalize(excitations);
        let timings = self.mapper.map(&normalized)?;
        let table = self.scheduler.schedule(&timings, carrier)?;
        Ok(Drive { normalized, table })
    }
}
