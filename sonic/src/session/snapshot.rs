use std::sync::{Arc, PoisonError, RwLock};

use getset::{CopyGetters, Getters};
use sonic_core::{excitation::Excitation, link::Frame};
use sonic_driver::MuxTable;
use sonic_holo::FocusPoint;

/// The result of one successful compute.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct Snapshot {
    #[getset(get_copy = "pub")]
    /// The generation counter. Incremented on every successful compute.
    generation: u32,
    #[getset(get = "pub")]
    /// The focus request.
    foci: Vec<FocusPoint>,
    #[getset(get = "pub")]
    /// The solver output, in array order.
    excitations: Vec<Excitation>,
    #[getset(get = "pub")]
    /// The excitations after phase quantization.
    normalized: Vec<Excitation>,
    #[getset(get = "pub")]
    /// The timing table.
    table: MuxTable,
    #[getset(get_copy = "pub")]
    /// The number of solver passes.
    iterations: usize,
    #[getset(get_copy = "pub")]
    /// Whether the solver reached the convergence tolerance.
    converged: bool,
}

impl Snapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        generation: u32,
        foci: Vec<FocusPoint>,
        excitations: Vec<Excitation>,
        normalized: Vec<Excitation>,
        table: MuxTable,
        iterations: usize,
        converged: bool,
    ) -> Self {
        Self {
            generation,
            foci,
            excitations,
            normalized,
            table,
            iterations,
            converged,
        }
    }

    /// Packs the timing table into a wire frame tagged with the generation.
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.table.to_frame(self.generation)
    }
}

pub(crate) type SharedSnapshot = Arc<RwLock<Option<Arc<Snapshot>>>>;

pub(crate) fn load(snapshot: &SharedSnapshot) -> Option<Arc<Snapshot>> {
    snapshot
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub(crate) fn store(snapshot: &SharedSnapshot, value: Arc<Snapshot>) {
    *snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
}

/// A read-only handle to the latest [`Snapshot`] of an [`ArraySession`].
///
/// The handle can be cloned and moved to other threads. It stays valid after the session is
/// closed and then keeps returning the last snapshot.
///
/// [`ArraySession`]: crate::ArraySession
#[derive(Clone, Debug)]
pub struct Inspector {
    pub(crate) snapshot: SharedSnapshot,
}

impl Inspector {
    /// The latest snapshot, or `None` if nothing has been computed yet.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        load(&self.snapshot)
    }

    /// The latest solver output.
    #[must_use]
    pub fn excitations(&self) -> Option<Vec<Excitation>> {
        self.latest().map(|s| s.excitations.clone())
    }

    /// The generation of the latest snapshot.
    #[must_use]
    pub fn generation(&self) -> Option<u32> {
        self.latest().map(|s| s.generation)
    }
}
