use std::time::Duration;

use sonic_core::common::Freq;
use thiserror::Error;

/// An error produced while turning excitations into a timing table.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum DriverError {
    /// The number of excitations does not match the number of channels.
    #[error("Expected {expected} channels, but got {actual}")]
    ChannelCountMismatch {
        /// The number of channels the driver is configured for.
        expected: usize,
        /// The number of channels supplied.
        actual: usize,
    },
    /// The number of channels exceeds what the wire format can address.
    #[error("Number of channels ({0}) exceeds the maximum ({max})", max = u16::MAX)]
    TooManyChannels(usize),

    /// The duty-cycle response curve is malformed.
    #[error("Invalid duty cycle curve: {0}")]
    InvalidCurve(String),
    /// A skew offset is not finite.
    #[error("Skew offset of channel ({0}) is not finite")]
    InvalidSkew(usize),
    /// A measured delay is negative or not finite.
    #[error("Delay of channel ({0}) must be a finite non-negative value, but got {1} ns")]
    InvalidDelay(usize, f32),
    /// The PWM generator configuration is malformed.
    #[error("Invalid PWM configuration: {0}")]
    InvalidPwm(String),
    /// The mux configuration is malformed.
    #[error("Invalid mux configuration: {0}")]
    InvalidMux(String),

    /// The pulse width required by the duty cycle is below the minimum on-time of the generator.
    #[error(
        "Pulse width of channel ({channel}) is {width} ticks, below the minimum on-time of {min} ticks"
    )]
    PulseWidthOutOfRange {
        /// The channel index.
        channel: usize,
        /// The required pulse width in ticks.
        width: u16,
        /// The minimum on-time of the generator in ticks.
        min: u16,
    },

    /// The settling time cannot be met with slots of at least one carrier cycle.
    #[error(
        "Visiting {bank_size} channels within {settling_time:?}/{margin} requires switching at {required:?}, faster than the carrier ({carrier:?})"
    )]
    SlotShorterThanCarrier {
        /// The mux fan-in.
        bank_size: usize,
        /// The acoustic settling time.
        settling_time: Duration,
        /// The visit margin.
        margin: f32,
        /// The required select rate.
        required: Freq<f32>,
        /// The carrier frequency.
        carrier: Freq<f32>,
    },
    /// The select rate exceeds the maximum switching rate of the mux.
    #[error(
        "Mux must switch at {rate:?} to reach the required {required:?}, but the hardware is limited to {max:?}"
    )]
    SwitchRateExceeded {
        /// The minimum select rate derived from the settling time and visit margin.
        required: Freq<f32>,
        /// The select rate of whole-carrier-cycle slots the schedule uses.
        rate: Freq<f32>,
        /// The maximum switching rate of the hardware.
        max: Freq<f32>,
    },
    /// A channel does not appear in any slot.
    #[error("Channel ({0}) is not scheduled in any slot")]
    UnscheduledChannel(usize),
    /// Two active channels of one bank share a slot.
    #[error("Channels ({first}) and ({second}) of bank ({bank}) collide in slot ({slot})")]
    BankCollision {
        /// The slot index.
        slot: usize,
        /// The bank index.
        bank: usize,
        /// The first colliding channel.
        first: usize,
        /// The second colliding channel.
        second: usize,
    },
}

impl DriverError {
    /// Returns `true` if the error comes from a value the hardware cannot represent.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::PulseWidthOutOfRange { .. })
    }

    /// Returns `true` if the error comes from the mux capacity.
    #[must_use]
    pub const fn is_scheduling_infeasible(&self) -> bool {
        matches!(
            self,
            Self::SlotShorterThanCarrier { .. }
                | Self::SwitchRateExceeded { .. }
                | Self::BankCollision { .. }
                | Self::UnscheduledChannel(_)
        )
    }
}
