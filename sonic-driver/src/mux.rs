use std::{num::NonZeroUsize, time::Duration};

use getset::{CopyGetters, Getters};
use itertools::Itertools;
use sonic_core::{
    common::{Freq, Hz, kHz},
    link::{ChannelEntry, Frame, FrameHeader},
};

use crate::{error::DriverError, timing::ChannelTiming};

/// The configuration of the multiplexer tree that routes each bank generator to its channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MuxConfig {
    /// The number of channels sharing one generator.
    pub bank_size: NonZeroUsize,
    /// The fan-in of each multiplexer in the select tree.
    pub tree_fan_in: NonZeroUsize,
    /// The maximum rate at which the select lines may change.
    pub max_switch_rate: Freq<f32>,
    /// The acoustic settling time of the emitters.
    pub settling_time: Duration,
    /// How many times every channel must be visited within one settling time.
    pub visit_margin: f32,
}

impl MuxConfig {
    /// Checks that the configuration describes a usable mux tree.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.bank_size.get() > u16::MAX as usize {
            return Err(DriverError::InvalidMux(format!(
                "bank size ({}) must not exceed {}",
                self.bank_size,
                u16::MAX
            )));
        }
        if self.tree_fan_in.get() < 2 {
            return Err(DriverError::InvalidMux(format!(
                "tree fan-in ({}) must be at least 2",
                self.tree_fan_in
            )));
        }
        if !(self.max_switch_rate.hz() > 0. && self.max_switch_rate.hz().is_finite()) {
            return Err(DriverError::InvalidMux(format!(
                "maximum switching rate ({:?}) must be positive",
                self.max_switch_rate
            )));
        }
        if self.settling_time.is_zero() {
            return Err(DriverError::InvalidMux(
                "settling time must be positive".to_string(),
            ));
        }
        if !(self.visit_margin > 0. && self.visit_margin.is_finite()) {
            return Err(DriverError::InvalidMux(format!(
                "visit margin ({}) must be positive",
                self.visit_margin
            )));
        }
        Ok(())
    }

    /// The number of multiplexer stages needed to address one bank.
    #[must_use]
    pub fn stages(&self) -> usize {
        let fan_in = self.tree_fan_in.get();
        let mut stages = 0;
        let mut reach = 1;
        while reach < self.bank_size.get() {
            reach = reach.saturating_mul(fan_in);
            stages += 1;
        }
        stages
    }

    /// Splits a select code into the select value of each stage, least significant stage first.
    #[must_use]
    pub fn select_lines(&self, select: usize) -> Vec<u16> {
        let fan_in = self.tree_fan_in.get();
        (0..self.stages())
            .scan(select, |rest, _| {
                let line = *rest % fan_in;
                *rest /= fan_in;
                Some(line as u16)
            })
            .collect()
    }

    /// The select rate needed to visit every channel of a bank `visit_margin` times per
    /// settling time.
    #[must_use]
    pub fn required_switch_rate(&self) -> Freq<f32> {
        self.bank_size.get() as f32 * self.visit_margin / self.settling_time.as_secs_f32() * Hz
    }
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            bank_size: NonZeroUsize::MIN.saturating_add(7),
            tree_fan_in: NonZeroUsize::MIN.saturating_add(7),
            max_switch_rate: 100. * kHz,
            settling_time: Duration::from_millis(2),
            visit_margin: 10.,
        }
    }
}

/// A group of channels sharing one generator.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct MuxBank {
    #[getset(get_copy = "pub")]
    /// The bank index.
    id: usize,
    #[getset(get = "pub")]
    /// The channels of the bank, ordered by select code.
    channels: Vec<usize>,
}

/// The timing of one channel together with its place in the mux schedule.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct TimingDescriptor {
    /// The channel index.
    channel: usize,
    /// The bank the channel belongs to.
    bank: usize,
    /// The select code that routes the bank generator to the channel.
    select: usize,
    /// The carrier timing of the channel.
    timing: ChannelTiming,
}

impl TimingDescriptor {
    /// The duty cycle in `[0, 0.5]`.
    #[must_use]
    pub fn duty(&self) -> f32 {
        self.timing.duty()
    }

    /// The rising-edge offset in carrier cycles.
    #[must_use]
    pub fn phase_offset(&self) -> f32 {
        self.timing.phase_offset()
    }
}

/// A cyclic select sequence.
///
/// Slot `s` drives select code `s` on every bank, so each bank generator serves exactly one of its
/// channels per slot. Slots last `slot_cycles` carrier cycles and the sequence repeats every
/// `bank_size` slots.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct MuxTable {
    #[getset(get = "pub")]
    /// The banks.
    banks: Vec<MuxBank>,
    #[getset(get = "pub")]
    /// The channels of each slot.
    sequence: Vec<Vec<usize>>,
    #[getset(get = "pub")]
    /// The descriptors in channel order.
    descriptors: Vec<TimingDescriptor>,
    #[getset(get_copy = "pub")]
    /// The number of carrier cycles each slot lasts.
    slot_cycles: u32,
    #[getset(get_copy = "pub")]
    /// The rate at which the select lines change.
    switch_rate: Freq<f32>,
    #[getset(get_copy = "pub")]
    /// The mux configuration the table was built with.
    config: MuxConfig,
}

impl MuxTable {
    /// The number of slots in one cycle of the sequence.
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.sequence.len()
    }

    /// The descriptors scheduled in slot `slot`.
    pub fn slot(&self, slot: usize) -> impl Iterator<Item = &TimingDescriptor> {
        self.sequence
            .get(slot)
            .into_iter()
            .flatten()
            .map(|&c| &self.descriptors[c])
    }

    /// The select line values of slot `slot`, least significant stage first.
    #[must_use]
    pub fn select_lines(&self, slot: usize) -> Vec<u16> {
        self.config.select_lines(slot)
    }

    /// The time the sequence takes to visit every channel once.
    #[must_use]
    pub fn visit_period(&self) -> Duration {
        Duration::from_secs_f32(self.num_slots() as f32 / self.switch_rate.hz())
    }

    /// Checks that every channel is scheduled and that no two active channels of the same bank
    /// share a slot.
    pub fn verify(&self) -> Result<(), DriverError> {
        let mut seen = vec![false; self.descriptors.len()];
        self.sequence
            .iter()
            .enumerate()
            .try_for_each(|(slot, channels)| {
                channels.iter().for_each(|&c| seen[c] = true);
                channels
                    .iter()
                    .map(|&c| &self.descriptors[c])
                    .filter(|d| d.timing.is_active())
                    .sorted_by_key(|d| d.bank)
                    .tuple_windows()
                    .find(|(a, b)| a.bank == b.bank)
                    .map_or(Ok(()), |(a, b)| {
                        Err(DriverError::BankCollision {
                            slot,
                            bank: a.bank,
                            first: a.channel,
                            second: b.channel,
                        })
                    })
            })?;
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(DriverError::UnscheduledChannel(missing));
        }
        Ok(())
    }

    /// Packs the table into a wire frame, slot-major.
    #[must_use]
    pub fn to_frame(&self, generation: u32) -> Frame {
        Frame::new(
            FrameHeader::new(
                generation,
                self.slot_cycles,
                self.banks.len() as u16,
                self.config.bank_size.get() as u16,
            ),
            self.sequence
                .iter()
                .flatten()
                .map(|&c| {
                    let d = &self.descriptors[c];
                    ChannelEntry::new(
                        d.channel as u16,
                        d.bank as u16,
                        d.select as u16,
                        d.timing.pulse_width(),
                        d.timing.phase_ticks(),
                    )
                })
                .collect(),
        )
    }
}

/// Partitions channels into banks and builds the select sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MuxScheduler {
    config: MuxConfig,
}

impl MuxScheduler {
    /// Creates a new [`MuxScheduler`].
    pub fn new(config: MuxConfig) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The mux configuration.
    #[must_use]
    pub const fn config(&self) -> MuxConfig {
        self.config
    }

    /// Schedules `timings` on a carrier of frequency `carrier`.
    ///
    /// Channel `c` belongs to bank `c / bank_size` with select code `c % bank_size`.
    #[tracing::instrument(level = "debug", skip_all, fields(channels = timings.len()))]
    pub fn schedule(
        &self,
        timings: &[ChannelTiming],
        carrier: Freq<f32>,
    ) -> Result<MuxTable, DriverError> {
        if timings.len() > u16::MAX as usize {
            return Err(DriverError::TooManyChannels(timings.len()));
        }

        let bank_size = self.config.bank_size.get();
        let required = self.config.required_switch_rate();
        // tolerate rounding in the unit conversions
        let slot_cycles = (carrier.hz() as f64 * self.config.settling_time.as_secs_f64()
            / (bank_size as f64 * self.config.visit_margin as f64)
            + 1e-6)
            .floor();
        if !(slot_cycles >= 1.) {
            return Err(DriverError::SlotShorterThanCarrier {
                bank_size,
                settling_time: self.config.settling_time,
                margin: self.config.visit_margin,
                required,
                carrier,
            });
        }
        let slot_cycles = slot_cycles.min(u32::MAX as f64) as u32;
        let switch_rate = carrier / slot_cycles as f32;
        if switch_rate > self.config.max_switch_rate {
            return Err(DriverError::SwitchRateExceeded {
                required,
                rate: switch_rate,
                max: self.config.max_switch_rate,
            });
        }

        let descriptors = timings
            .iter()
            .enumerate()
            .map(|(channel, &timing)| TimingDescriptor {
                channel,
                bank: channel / bank_size,
                select: channel % bank_size,
                timing,
            })
            .collect::<Vec<_>>();
        let banks = (0..timings.len().div_ceil(bank_size))
            .map(|id| MuxBank {
                id,
                channels: (id * bank_size..((id + 1) * bank_size).min(timings.len()))
                    .collect(),
            })
            .collect::<Vec<_>>();
        let sequence = (0..bank_size)
            .map(|select| {
                banks
                    .iter()
                    .filter_map(|bank| bank.channels.get(select).copied())
                    .collect()
            })
            .collect();

        let table = MuxTable {
            banks,
            sequence,
            descriptors,
            slot_cycles,
            switch_rate,
            config: self.config,
        };
        table.verify()?;

        tracing::debug!(
            banks = table.banks.len(),
            slot_cycles,
            switch_rate = ?switch_rate,
            "scheduled"
        );

        Ok(table)
    }
}

impl Default for MuxScheduler {
    fn default() -> Self {
        Self {
            config: MuxConfig::default(),
        }
    }
}
