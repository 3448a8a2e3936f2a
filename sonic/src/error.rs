use sonic_core::{geometry::GeometryError, link::LinkError};
use sonic_driver::DriverError;
use sonic_holo::HoloError;
use thiserror::Error;

/// The class of a [`SonicError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed array, request or drive configuration. Fatal for the request.
    Configuration,
    /// A value the hardware cannot represent even after clamping.
    OutOfRange,
    /// The mux cannot visit every channel fast enough.
    SchedulingInfeasible,
    /// The transport failed. The computed excitations are retained.
    HardwareLink,
}

/// A malformed configuration or request.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The emitter geometry is malformed.
    #[error("{0}")]
    Geometry(#[from] GeometryError),
    /// The focus request is malformed.
    #[error("{0}")]
    Focus(#[from] HoloError),
    /// The drive configuration is malformed.
    #[error("{0}")]
    Drive(DriverError),
    /// A configuration value is out of its domain.
    #[error("Invalid value for `{0}`: {1}")]
    InvalidValue(&'static str, String),
    /// The configuration source could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(String),
    /// The configuration source could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// An error produced by an [`ArraySession`].
///
/// [`ArraySession`]: crate::ArraySession
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum SonicError {
    /// See [`ConfigurationError`].
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
    /// A duty cycle requires a pulse the generator cannot emit.
    #[error("{0}")]
    OutOfRange(DriverError),
    /// The mux schedule cannot meet the settling time.
    #[error("{0}")]
    SchedulingInfeasible(DriverError),
    /// The transport to the hardware failed.
    #[error("Hardware link error: {0}")]
    HardwareLink(#[from] LinkError),
}

impl SonicError {
    /// Gets the class of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::OutOfRange(_) => ErrorKind::OutOfRange,
            Self::SchedulingInfeasible(_) => ErrorKind::SchedulingInfeasible,
            Self::HardwareLink(_) => ErrorKind::HardwareLink,
        }
    }
}

impl From<DriverError> for SonicError {
    fn from(e: DriverError) -> Self {
        if e.is_out_of_range() {
            Self::OutOfRange(e)
        } else if e.is_scheduling_infeasible() {
            Self::SchedulingInfeasible(e)
        } else {
            Self::Configuration(ConfigurationError::Drive(e))
        }
    }
}

impl From<GeometryError> for SonicError {
    fn from(e: GeometryError) -> Self {
        Self::Configuration(e.into())
    }
}

impl From<HoloError> for SonicError {
    fn from(e: HoloError) -> Self {
        Self::Configuration(e.into())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sonic_core::common::kHz;

    use super::*;

    #[rstest::rstest]
    #[case(ErrorKind::Configuration, GeometryError::NoEmitter.into())]
    #[case(ErrorKind::Configuration, HoloError::NoFocus.into())]
    #[case(ErrorKind::Configuration, DriverError::InvalidSkew(0).into())]
    #[case(
        ErrorKind::OutOfRange,
        DriverError::PulseWidthOutOfRange { channel: 0, width: 1, min: 2 }.into()
    )]
    #[case(
        ErrorKind::SchedulingInfeasible,
        DriverError::SwitchRateExceeded {
            required: 20. * kHz,
            rate: 40. * kHz,
            max: 10. * kHz
        }
        .into()
    )]
    #[case(
        ErrorKind::SchedulingInfeasible,
        DriverError::SlotShorterThanCarrier {
            bank_size: 8,
            settling_time: Duration::from_micros(100),
            margin: 10.,
            required: 800. * kHz,
            carrier: 40. * kHz,
        }
        .into()
    )]
    #[case(ErrorKind::HardwareLink, LinkError::closed().into())]
    fn kind(#[case] expected: ErrorKind, #[case] err: SonicError) {
        assert_eq!(expected, err.kind());
    }

    #[test]
    fn display() {
        assert_eq!(
            "Array must contain at least one emitter",
            SonicError::from(GeometryError::NoEmitter).to_string()
        );
        assert_eq!(
            "Hardware link error: Link is closed",
            SonicError::from(LinkError::closed()).to_string()
        );
        assert_eq!(
            "Invalid value for `bank_size`: must be positive",
            SonicError::from(ConfigurationError::InvalidValue(
                "bank_size",
                "must be positive".to_string()
            ))
            .to_string()
        );
    }
}
