use sonic_core::{
    common::Angle,
    geometry::{Complex, Point3},
};

use crate::error::HoloError;

/// A point where the emitted wavefronts should interfere constructively.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusPoint {
    /// The target position.
    pub position: Point3,
    /// The desired relative complex amplitude.
    ///
    /// Its argument is the phase offset between simultaneous foci.
    pub weight: Complex,
}

impl FocusPoint {
    /// Creates a focus with a real, non-negative weight.
    #[must_use]
    pub const fn new(position: Point3, weight: f32) -> Self {
        Self {
            position,
            weight: Complex::new(weight, 0.),
        }
    }

    /// Creates a focus with a complex weight `amplitude·e^{i·phase}`.
    #[must_use]
    pub fn with_phase(position: Point3, amplitude: f32, phase: Angle) -> Self {
        Self {
            position,
            weight: Complex::from_polar(amplitude, phase.radian()),
        }
    }

    /// Gets the amplitude component of the weight.
    #[must_use]
    pub fn amplitude(&self) -> f32 {
        self.weight.norm()
    }
}

impl From<(f32, f32, f32, f32)> for FocusPoint {
    fn from((x, y, z, w): (f32, f32, f32, f32)) -> Self {
        Self::new(Point3::new(x, y, z), w)
    }
}

impl From<[f32; 4]> for FocusPoint {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(Point3::new(x, y, z), w)
    }
}

/// A validated focus request.
#[derive(Debug)]
pub(crate) struct Foci {
    pub(crate) foci: Vec<FocusPoint>,
    /// Whether the relative phases between foci are prescribed by the weights.
    pub(crate) phase_locked: bool,
}

impl Foci {
    /// Validates `foci` and merges exactly coincident points, keeping first-occurrence order.
    pub(crate) fn new(foci: &[FocusPoint]) -> Result<Self, HoloError> {
        if foci.is_empty() {
            return Err(HoloError::NoFocus);
        }
        foci.iter().enumerate().try_for_each(|(i, f)| {
            let p = f.position;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(HoloError::InvalidFocus(i));
            }
            let w = f.weight;
            if !(w.re.is_finite() && w.im.is_finite()) || (w.im == 0. && w.re < 0.) {
                return Err(HoloError::InvalidWeight(i, w));
            }
            Ok(())
        })?;

        let phase_locked = foci.iter().any(|f| f.weight.im != 0.);

        let mut merged: Vec<FocusPoint> = Vec::with_capacity(foci.len());
        foci.iter().for_each(|f| {
            match merged.iter_mut().find(|m| m.position == f.position) {
                Some(m) => m.weight += f.weight,
                None => merged.push(*f),
            }
        });

        if merged.iter().all(|f| f.amplitude() == 0.) {
            return Err(HoloError::ZeroWeight);
        }

        Ok(Self {
            foci: merged,
            phase_locked,
        })
    }

    /// Gets the index of the focus with the largest amplitude. Ties resolve to the first one.
    pub(crate) fn dominant(&self) -> usize {
        self.foci
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |(bi, ba), (i, f)| {
                let a = f.amplitude();
                if a > ba { (i, a) } else { (bi, ba) }
            })
            .0
    }

    pub(crate) fn positions(&self) -> Vec<Point3> {
        self.foci.iter().map(|f| f.position).collect()
    }
}
