use getset::CopyGetters;
use sonic_core::{common::PI, excitation::Excitation};

use crate::{curve::DutyCycleCurve, error::DriverError, skew::SkewCorrectionTable};

/// The configuration of the PWM generator that synthesizes the carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmConfig {
    /// The number of generator ticks per carrier cycle.
    pub period_ticks: u16,
    /// The shortest non-zero pulse the generator can emit, in ticks.
    pub min_on_ticks: u16,
}

impl PwmConfig {
    /// Checks that the configuration describes a usable generator.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.period_ticks < 2 {
            return Err(DriverError::InvalidPwm(format!(
                "period ({} ticks) must be at least 2 ticks",
                self.period_ticks
            )));
        }
        if self.min_on_ticks > self.period_ticks / 2 {
            return Err(DriverError::InvalidPwm(format!(
                "minimum on-time ({} ticks) exceeds half the period ({} ticks)",
                self.min_on_ticks, self.period_ticks
            )));
        }
        Ok(())
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            period_ticks: 512,
            min_on_ticks: 0,
        }
    }
}

/// The carrier timing of one channel.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ChannelTiming {
    /// The duty cycle in `[0, 0.5]`.
    duty: f32,
    /// The rising-edge offset in carrier cycles, in `[0, 1)`.
    phase_offset: f32,
    /// The pulse width in generator ticks.
    pulse_width: u16,
    /// The rising-edge offset in generator ticks.
    phase_ticks: u16,
}

impl ChannelTiming {
    /// Returns `true` if the channel emits.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.pulse_width > 0
    }
}

/// Converts excitations into carrier timings.
///
/// The duty cycle follows the [`DutyCycleCurve`] so that the emitted amplitude is linear in the
/// requested one, and the phase offset is `phase/2π + skew`, wrapped into one carrier cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseToTimingMapper {
    curve: DutyCycleCurve,
    skew: SkewCorrectionTable,
    pwm: PwmConfig,
}

impl PhaseToTimingMapper {
    /// Creates a new [`PhaseToTimingMapper`].
    pub fn new(
        curve: DutyCycleCurve,
        skew: SkewCorrectionTable,
        pwm: PwmConfig,
    ) -> Result<Self, DriverError> {
        pwm.validate()?;
        Ok(Self { curve, skew, pwm })
    }

    /// Creates a mapper with the default curve and generator and no skew correction.
    #[must_use]
    pub fn uncorrected(channels: usize) -> Self {
        Self {
            curve: DutyCycleCurve::default(),
            skew: SkewCorrectionTable::zeros(channels),
            pwm: PwmConfig::default(),
        }
    }

    /// The duty-cycle response curve.
    #[must_use]
    pub const fn curve(&self) -> &DutyCycleCurve {
        &self.curve
    }

    /// The skew correction table.
    #[must_use]
    pub const fn skew(&self) -> &SkewCorrectionTable {
        &self.skew
    }

    /// The PWM generator configuration.
    #[must_use]
    pub const fn pwm(&self) -> PwmConfig {
        self.pwm
    }

    /// The number of channels the mapper is configured for.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.skew.len()
    }

    /// Maps the excitation of channel `channel`.
    ///
    /// Any non-zero amplitude whose pulse is shorter than the minimum on-time is rejected, even if
    /// the pulse rounds to zero ticks. A channel whose pulse rounds to zero ticks is inactive and
    /// reports a duty cycle of zero.
    pub fn map_channel(
        &self,
        channel: usize,
        excitation: &Excitation,
    ) -> Result<ChannelTiming, DriverError> {
        let period = self.pwm.period_ticks as f32;

        let duty = self.curve.duty(excitation.amplitude());
        let pulse_width = (duty * period).round() as u16;
        if excitation.amplitude() > 0. && pulse_width < self.pwm.min_on_ticks {
            return Err(DriverError::PulseWidthOutOfRange {
                channel,
                width: pulse_width,
                min: self.pwm.min_on_ticks,
            });
        }
        let duty = if pulse_width == 0 { 0. } else { duty };

        let skew = self.skew.offsets().get(channel).copied().unwrap_or(0.);
        let phase_offset = wrap_cycle(excitation.phase().radian() / (2.0 * PI) + skew);
        let phase_ticks =
            ((phase_offset * period).round() as u32 % self.pwm.period_ticks as u32) as u16;

        Ok(ChannelTiming {
            duty,
            phase_offset,
            pulse_width,
            phase_ticks,
        })
    }

    /// Maps every excitation. The number of excitations must equal the number of channels.
    #[tracing::instrument(level = "debug", skip_all, fields(channels = excitations.len()))]
    pub fn map(&self, excitations: &[Excitation]) -> Result<Vec<ChannelTiming>, DriverError> {
        if excitations.len() != self.num_channels() {
            return Err(DriverError::ChannelCountMismatch {
                expected: self.num_channels(),
                actual: excitations.len(),
            });
        }
        excitations
            .iter()
            .enumerate()
            .map(|(i, e)| self.map_channel(i, e))
            .collect()
    }
}

fn wrap_cycle(x: f32) -> f32 {
    let r = x.rem_euclid(1.);
    if r >= 1. { 0. } else { r }
}
