mod builder;
mod snapshot;

use std::{marker::PhantomData, sync::Arc};

use derive_more::Debug;
use itertools::Itertools;
use sonic_core::{
    acoustics::directivity::{Directivity, Sphere},
    excitation::Excitation,
    geometry::EmitterArray,
    link::{Frame, Link, LinkError},
};
use sonic_driver::DriveConfig;
use sonic_holo::{FocusPoint, IBP, IBPOption};
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};

pub use builder::ArraySessionBuilder;
pub use snapshot::{Inspector, Snapshot};

use crate::{error::SonicError, link::Nop};
use snapshot::{SharedSnapshot, load, store};

/// A long-lived handle to an emitter array and its link.
///
/// Each request runs solve, normalize, map and schedule against the array, and publishes the
/// result as a [`Snapshot`] only when every stage succeeds. The snapshot is independent of the
/// link: a failed push never discards it.
///
/// At most one push is in flight. A new request supersedes it: the in-flight push is aborted and
/// the link receives either a complete frame or nothing.
#[derive(Debug)]
pub struct ArraySession<L: Link, D: Directivity = Sphere> {
    array: EmitterArray,
    drive: DriveConfig,
    option: IBPOption,
    #[debug(ignore)]
    link: Arc<Mutex<L>>,
    link_error: Option<LinkError>,
    #[debug(ignore)]
    snapshot: SharedSnapshot,
    #[debug(ignore)]
    in_flight: Option<JoinHandle<Result<(), LinkError>>>,
    generation: u32,
    #[debug(ignore)]
    directivity: PhantomData<D>,
}

impl ArraySession<Nop> {
    /// Creates a builder for `array` with the default drive configuration and solver option.
    #[must_use]
    pub fn builder(array: EmitterArray) -> ArraySessionBuilder {
        ArraySessionBuilder::new(array)
    }
}

impl<L: Link, D: Directivity> ArraySession<L, D> {
    /// The emitter array.
    #[must_use]
    pub const fn array(&self) -> &EmitterArray {
        &self.array
    }

    /// The drive configuration.
    #[must_use]
    pub const fn drive(&self) -> &DriveConfig {
        &self.drive
    }

    /// The solver option.
    #[must_use]
    pub const fn option(&self) -> IBPOption {
        self.option
    }

    /// The error the link reported when it was opened, if any.
    #[must_use]
    pub const fn link_error(&self) -> Option<&LinkError> {
        self.link_error.as_ref()
    }

    /// Locks the link. Waits for the in-flight push, if any, to release it.
    pub async fn link(&self) -> MutexGuard<'_, L> {
        self.link.lock().await
    }

    /// Runs the compute pipeline for `foci` and publishes the result.
    ///
    /// On failure the previous snapshot stays in place.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compute(
        &mut self,
        foci: impl IntoIterator<Item = FocusPoint>,
    ) -> Result<Arc<Snapshot>, SonicError> {
        let foci = foci.into_iter().collect::<Vec<_>>();
        let solution = IBP::<D>::with_directivity(foci.iter().copied(), self.option)
            .solve(&self.array)?;
        let (normalized, table) = self
            .drive
            .drive(solution.excitations(), self.array.carrier())?
            .into_parts();

        let generation = self.generation.wrapping_add(1);
        let iterations = solution.iterations();
        let converged = solution.converged();
        let snapshot = Arc::new(Snapshot::new(
            generation,
            foci,
            solution.into_excitations(),
            normalized,
            table,
            iterations,
            converged,
        ));
        self.generation = generation;
        store(&self.snapshot, snapshot.clone());
        tracing::debug!(generation, iterations, converged, "Snapshot updated");
        Ok(snapshot)
    }

    /// Computes `foci` and pushes the result, waiting for the link to commit it.
    ///
    /// A transport failure is reported as [`SonicError::HardwareLink`]; the snapshot is already
    /// published at that point.
    pub async fn send(
        &mut self,
        foci: impl IntoIterator<Item = FocusPoint>,
    ) -> Result<(), SonicError> {
        let snapshot = self.compute(foci)?;
        self.supersede();
        push(self.link.clone(), self.link_error.clone(), snapshot.frame())
            .await?;
        Ok(())
    }

    /// Computes `foci` and starts pushing the result in the background, superseding any push in
    /// flight. Use [`flush`] to wait for the push.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    ///
    /// [`flush`]: Self::flush
    pub fn submit(
        &mut self,
        foci: impl IntoIterator<Item = FocusPoint>,
    ) -> Result<Arc<Snapshot>, SonicError> {
        let snapshot = self.compute(foci)?;
        self.supersede();
        self.in_flight = Some(tokio::spawn(push(
            self.link.clone(),
            self.link_error.clone(),
            snapshot.frame(),
        )));
        Ok(snapshot)
    }

    /// Waits for the latest submitted push. Returns immediately if none is in flight.
    pub async fn flush(&mut self) -> Result<(), SonicError> {
        let Some(handle) = self.in_flight.take() else {
            return Ok(());
        };
        match handle.await {
            Ok(res) => Ok(res?),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(LinkError::new(e).into()),
        }
    }

    /// Returns `true` if a submitted push has not finished yet.
    #[must_use]
    pub fn is_pushing(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The latest snapshot, or `None` if nothing has been computed yet.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        load(&self.snapshot)
    }

    /// The latest solver output.
    #[must_use]
    pub fn excitations(&self) -> Option<Vec<Excitation>> {
        self.snapshot().map(|s| s.excitations().clone())
    }

    /// Creates a read-only handle to the snapshot.
    #[must_use]
    pub fn inspector(&self) -> Inspector {
        Inspector {
            snapshot: self.snapshot.clone(),
        }
    }

    /// Aborts any push in flight and closes the link.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn close(mut self) -> Result<(), SonicError> {
        self.supersede();
        let mut link = self.link.lock().await;
        if !link.is_open() {
            tracing::warn!("Link is already closed");
            return Ok(());
        }
        link.close().await?;
        Ok(())
    }

    fn supersede(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                tracing::debug!("Superseding in-flight push");
            }
            handle.abort();
        }
    }
}

impl<L: Link, D: Directivity> Drop for ArraySession<L, D> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

async fn push<L: Link>(
    link: Arc<Mutex<L>>,
    open_error: Option<LinkError>,
    frame: Frame,
) -> Result<(), LinkError> {
    let mut link = link.lock_owned().await;
    if !link.is_open() {
        return Err(open_error.unwrap_or_else(LinkError::closed));
    }
    let entries = frame.entries().iter().format_with(", ", |e, f| {
        f(&format_args!("{}:{}/{}", e.channel(), e.pulse_width(), e.phase()))
    });
    tracing::trace!("Pushing frame {}: {}", frame.header().generation(), entries);
    link.send(&frame)
        .await
        .inspect_err(|e| tracing::warn!("Failed to push frame: {}", e))
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, thread};

    use sonic_core::{
        common::{PI, kHz, mm},
        geometry::Point3,
    };
    use sonic_driver::{MuxConfig, MuxScheduler};

    use super::*;
    use crate::{
        error::{ConfigurationError, ErrorKind},
        tests::create_array,
    };

    fn focus() -> FocusPoint {
        FocusPoint::new(Point3::new(0., 0., 150. * mm), 1.)
    }

    #[tokio::test]
    async fn compute_publishes_snapshot() -> anyhow::Result<()> {
        let mut session = ArraySession::builder(create_array(4, 4))
            .open(Nop::new())
            .await?;
        assert!(session.snapshot().is_none());
        assert!(session.excitations().is_none());

        let first = session.compute([focus()])?;
        assert_eq!(1, first.generation());
        assert_eq!(16, first.excitations().len());
        assert_eq!(16, first.normalized().len());
        assert_eq!(&[focus()], first.foci().as_slice());
        assert_eq!(Some(first.clone()), session.snapshot());

        let second = session.compute([focus()])?;
        assert_eq!(2, second.generation());
        assert_eq!(Some(2), session.inspector().generation());
        Ok(())
    }

    #[tokio::test]
    async fn failed_compute_keeps_snapshot() -> anyhow::Result<()> {
        let mut session = ArraySession::builder(create_array(4, 4))
            .open(Nop::new())
            .await?;
        let snapshot = session.compute([focus()])?;

        let err = session.compute(Vec::new()).unwrap_err();
        assert_eq!(ErrorKind::Configuration, err.kind());
        assert_eq!(Some(snapshot), session.snapshot());

        let next = session.compute([focus()])?;
        assert_eq!(2, next.generation());
        Ok(())
    }

    #[tokio::test]
    async fn scheduling_infeasible() -> anyhow::Result<()> {
        let array = create_array(4, 4);
        let mut drive = DriveConfig::new(array.num_emitters());
        drive.scheduler = MuxScheduler::new(MuxConfig {
            max_switch_rate: 10. * kHz,
            ..Default::default()
        })?;
        let mut session = ArraySession::builder(array)
            .with_drive(drive)
            .open(Nop::new())
            .await?;

        let err = session.compute([focus()]).unwrap_err();
        assert_eq!(ErrorKind::SchedulingInfeasible, err.kind());
        assert!(session.snapshot().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn drive_channel_mismatch() {
        let err = ArraySession::builder(create_array(4, 4))
            .with_drive(DriveConfig::new(8))
            .open(Nop::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SonicError::Configuration(ConfigurationError::Drive(_))
        ));
    }

    #[tokio::test]
    async fn option() -> anyhow::Result<()> {
        let option = IBPOption {
            iterations: NonZeroUsize::MIN,
            ..Default::default()
        };
        let mut session = ArraySession::builder(create_array(4, 4))
            .with_option(option)
            .with_directivity::<sonic_holo::T4010A1>()
            .open(Nop::new())
            .await?;
        assert_eq!(option, session.option());
        assert_eq!(16, session.array().num_emitters());
        assert_eq!(16, session.drive().num_channels());
        assert_eq!(1, session.compute([focus()])?.iterations());
        Ok(())
    }

    #[tokio::test]
    async fn inspector_from_other_thread() -> anyhow::Result<()> {
        let mut session = ArraySession::builder(create_array(4, 4))
            .open(Nop::new())
            .await?;
        let inspector = session.inspector();
        assert!(inspector.latest().is_none());

        session.compute([focus()])?;

        let excitations = thread::spawn(move || inspector.excitations()).join();
        let excitations = excitations.map_err(|_| anyhow::anyhow!("inspector thread panicked"))?;
        assert_eq!(session.excitations(), excitations);
        excitations
            .iter()
            .flatten()
            .for_each(|e| assert!((0.0..2. * PI).contains(&e.phase().radian())));
        Ok(())
    }

    #[tokio::test]
    async fn send_and_close() -> anyhow::Result<()> {
        let mut session = ArraySession::builder(create_array(2, 2))
            .open(Nop::new())
            .await?;
        assert!(session.link().await.is_open());
        session.send([focus()]).await?;
        assert!(!session.is_pushing());
        session.close().await?;
        Ok(())
    }
}
