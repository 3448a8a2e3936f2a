use super::{Emitter, Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use crate::common::{Freq, ULTRASOUND_FREQ, mm};

/// A planar rectangular emitter grid.
///
/// Emitters are laid out row-major in the local xy-plane starting at `origin`, and face the
/// local +z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    /// The number of rows (along local y).
    pub rows: usize,
    /// The number of columns (along local x).
    pub cols: usize,
    /// The spacing between adjacent emitters \[m\].
    pub pitch: f32,
    /// The position of the first emitter.
    pub origin: Point3,
    /// The rotation of the grid.
    pub rotation: UnitQuaternion,
    /// The carrier frequency.
    pub frequency: Freq<f32>,
}

impl Grid {
    /// Creates a centered grid: the grid center is placed at `center`.
    #[must_use]
    pub fn centered(rows: usize, cols: usize, pitch: f32, center: Point3) -> Self {
        let origin = center
            - Vector3::new(
                (cols.saturating_sub(1)) as f32 * pitch / 2.,
                (rows.saturating_sub(1)) as f32 * pitch / 2.,
                0.,
            );
        Self {
            rows,
            cols,
            pitch,
            origin,
            ..Default::default()
        }
    }

    /// Gets the number of emitters.
    #[must_use]
    pub const fn num_emitters(&self) -> usize {
        self.rows * self.cols
    }

    /// Generates the emitters.
    #[must_use]
    pub fn emitters(&self) -> Vec<Emitter> {
        let isometry = Isometry3 {
            rotation: self.rotation,
            translation: Translation3::from(self.origin),
        };
        let normal = self.rotation * Vector3::z_axis();
        (0..self.rows)
            .flat_map(|y| {
                (0..self.cols).map(move |x| {
                    Emitter::new(
                        isometry * Point3::new(x as f32 * self.pitch, y as f32 * self.pitch, 0.),
                        normal,
                        self.frequency,
                    )
                })
            })
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 16,
            pitch: 10.5 * mm,
            origin: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            frequency: ULTRASOUND_FREQ,
        }
    }
}

impl From<Grid> for Vec<Emitter> {
    fn from(grid: Grid) -> Self {
        grid.emitters()
    }
}
