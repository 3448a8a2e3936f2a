use std::{
    marker::PhantomData,
    sync::{Arc, RwLock},
};

use derive_more::Debug;
use sonic_core::{
    acoustics::directivity::{Directivity, Sphere},
    geometry::EmitterArray,
    link::Link,
};
use sonic_driver::{DriveConfig, DriverError};
use sonic_holo::IBPOption;

use super::ArraySession;
use crate::{
    config::ArrayConfig,
    error::{ConfigurationError, SonicError},
};

/// Builder for [`ArraySession`].
#[derive(Debug)]
pub struct ArraySessionBuilder<D: Directivity = Sphere> {
    array: EmitterArray,
    drive: DriveConfig,
    option: IBPOption,
    #[debug(ignore)]
    directivity: PhantomData<D>,
}

impl ArraySessionBuilder<Sphere> {
    pub(crate) fn new(array: EmitterArray) -> Self {
        let drive = DriveConfig::new(array.num_emitters());
        Self {
            array,
            drive,
            option: IBPOption::default(),
            directivity: PhantomData,
        }
    }

    /// Creates a builder from a loaded configuration.
    pub fn from_config(config: &ArrayConfig) -> Result<Self, SonicError> {
        let (array, drive, option) = config.build()?;
        Ok(Self::new(array).with_drive(drive).with_option(option))
    }
}

impl<D: Directivity> ArraySessionBuilder<D> {
    /// Sets the drive configuration.
    #[must_use]
    pub fn with_drive(self, drive: DriveConfig) -> Self {
        Self { drive, ..self }
    }

    /// Sets the solver option.
    #[must_use]
    pub fn with_option(self, option: IBPOption) -> Self {
        Self { option, ..self }
    }

    /// Sets the directivity model used by the solver.
    #[must_use]
    pub fn with_directivity<D2: Directivity>(self) -> ArraySessionBuilder<D2> {
        ArraySessionBuilder {
            array: self.array,
            drive: self.drive,
            option: self.option,
            directivity: PhantomData,
        }
    }

    /// Opens `link` and returns the session.
    ///
    /// A link that fails to open does not fail the session: the error is logged and reported by
    /// every subsequent push.
    #[tracing::instrument(level = "debug", skip_all, fields(emitters = self.array.num_emitters()))]
    pub async fn open<L: Link>(self, mut link: L) -> Result<ArraySession<L, D>, SonicError> {
        if self.drive.num_channels() != self.array.num_emitters() {
            return Err(ConfigurationError::Drive(DriverError::ChannelCountMismatch {
                expected: self.array.num_emitters(),
                actual: self.drive.num_channels(),
            })
            .into());
        }

        let link_error = match link.open(&self.array).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Failed to open link: {}", e);
                Some(e)
            }
        };

        Ok(ArraySession {
            array: self.array,
            drive: self.drive,
            option: self.option,
            link: Arc::new(tokio::sync::Mutex::new(link)),
            link_error,
            snapshot: Arc::new(RwLock::new(None)),
            in_flight: None,
            generation: 0,
            directivity: PhantomData,
        })
    }
}
