use std::{
    io::Read,
    num::{NonZeroU16, NonZeroUsize},
    path::Path,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use sonic_core::{
    common::{Hz, ULTRASOUND_FREQ},
    environment::Environment,
    geometry::{Emitter, EmitterArray, GeometryError, Grid, Point3, UnitVector3, Vector3},
};
use sonic_driver::{
    DriveConfig, DutyCycleCurve, MuxConfig, MuxScheduler, PhaseNormalizer, PhaseToTimingMapper,
    PwmConfig, SkewCorrectionTable,
};
use sonic_holo::IBPOption;

use crate::error::{ConfigurationError, SonicError};

/// The layout of the emitters. Lengths are in meters, frequencies in Hz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum EmitterLayout {
    /// A planar grid facing +z, centered at `center`.
    Grid {
        /// The number of rows.
        rows: usize,
        /// The number of columns.
        cols: usize,
        /// The spacing between adjacent emitters.
        pitch: f32,
        /// The center of the grid.
        #[serde(default)]
        center: [f32; 3],
        /// The carrier frequency.
        #[serde(default = "default_frequency")]
        frequency: f32,
    },
    /// An explicit list of emitters.
    List(Vec<EmitterSpec>),
}

/// A single emitter entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitterSpec {
    /// The position.
    pub position: [f32; 3],
    /// The direction the emitter faces. Need not be normalized.
    #[serde(default = "default_normal")]
    pub normal: [f32; 3],
    /// The carrier frequency.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
}

fn default_normal() -> [f32; 3] {
    [0., 0., 1.]
}

fn default_frequency() -> f32 {
    ULTRASOUND_FREQ.hz()
}

/// The per-channel skew correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewConfig {
    /// Offsets in carrier cycles.
    Cycles(Vec<f32>),
    /// Measured delays in nanoseconds.
    DelaysNs(Vec<f32>),
}

/// The PWM generator section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PwmSection {
    /// The number of generator ticks per carrier cycle.
    pub period_ticks: u16,
    /// The shortest non-zero pulse in ticks.
    pub min_on_ticks: u16,
}

impl Default for PwmSection {
    fn default() -> Self {
        let PwmConfig {
            period_ticks,
            min_on_ticks,
        } = PwmConfig::default();
        Self {
            period_ticks,
            min_on_ticks,
        }
    }
}

/// The mux section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuxSection {
    /// The number of channels sharing one generator.
    pub bank_size: usize,
    /// The fan-in of each multiplexer.
    pub tree_fan_in: usize,
    /// The maximum switching rate in Hz.
    pub max_switch_rate_hz: f32,
    /// The acoustic settling time in microseconds.
    pub settling_time_us: f32,
    /// How many times every channel must be visited within one settling time.
    pub visit_margin: f32,
}

impl Default for MuxSection {
    fn default() -> Self {
        let config = MuxConfig::default();
        Self {
            bank_size: config.bank_size.get(),
            tree_fan_in: config.tree_fan_in.get(),
            max_switch_rate_hz: config.max_switch_rate.hz(),
            settling_time_us: config.settling_time.as_micros() as f32,
            visit_margin: config.visit_margin,
        }
    }
}

impl MuxSection {
    fn to_config(self) -> Result<MuxConfig, ConfigurationError> {
        Ok(MuxConfig {
            bank_size: NonZeroUsize::new(self.bank_size)
                .ok_or_else(|| positive("mux.bank_size"))?,
            tree_fan_in: NonZeroUsize::new(self.tree_fan_in)
                .ok_or_else(|| positive("mux.tree_fan_in"))?,
            max_switch_rate: self.max_switch_rate_hz * Hz,
            settling_time: Duration::try_from_secs_f64(self.settling_time_us as f64 * 1e-6)
                .map_err(|e| {
                    ConfigurationError::InvalidValue("mux.settling_time_us", e.to_string())
                })?,
            visit_margin: self.visit_margin,
        })
    }
}

/// The solver section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    /// The maximum number of passes.
    pub iterations: usize,
    /// The convergence tolerance in radians.
    pub convergence_tol: f32,
}

impl Default for SolverSection {
    fn default() -> Self {
        let option = IBPOption::default();
        Self {
            iterations: option.iterations.get(),
            convergence_tol: option.convergence_tol,
        }
    }
}

/// The startup configuration of an array, loaded from JSON.
///
/// ```json
/// {
///   "temperature": 20.0,
///   "emitters": { "grid": { "rows": 8, "cols": 8, "pitch": 0.0105 } },
///   "skew": { "delays_ns": [0.0, 12.5, 25.0] },
///   "mux": { "bank_size": 8, "settling_time_us": 2000.0 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrayConfig {
    /// The speed of sound in m/s. Takes precedence over `temperature`.
    #[serde(default)]
    pub sound_speed: Option<f32>,
    /// The air temperature in °C, used to derive the speed of sound.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// The emitters.
    pub emitters: EmitterLayout,
    /// The skew correction. Defaults to none.
    #[serde(default)]
    pub skew: Option<SkewConfig>,
    /// The duty-cycle response curve as `[amplitude, duty]` points. Defaults to the arcsine curve.
    #[serde(default)]
    pub duty_curve: Option<Vec<[f32; 2]>>,
    /// The PWM generator.
    #[serde(default)]
    pub pwm: PwmSection,
    /// The mux.
    #[serde(default)]
    pub mux: MuxSection,
    /// The number of phase quantization steps per cycle.
    #[serde(default = "default_phase_steps")]
    pub phase_steps: u16,
    /// The solver.
    #[serde(default)]
    pub solver: SolverSection,
}

fn default_phase_steps() -> u16 {
    PhaseNormalizer::DEFAULT_STEPS.get()
}

fn positive(key: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidValue(key, "must be positive".to_string())
}

impl ArrayConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, SonicError> {
        serde_json::from_str(s)
            .map_err(|e| ConfigurationError::Parse(e.to_string()).into())
    }

    /// Parses a configuration from a JSON reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, SonicError> {
        serde_json::from_reader(reader)
            .map_err(|e| ConfigurationError::Parse(e.to_string()).into())
    }

    /// Loads a configuration from a JSON file.
    #[tracing::instrument(level = "debug")]
    pub fn from_path(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, SonicError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            ConfigurationError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn environment(&self) -> Result<Environment, ConfigurationError> {
        match (self.sound_speed, self.temperature) {
            (Some(c), _) => Ok(Environment::with_sound_speed(c)),
            (None, Some(t)) => {
                if !(t.is_finite() && t > -273.15) {
                    return Err(ConfigurationError::InvalidValue(
                        "temperature",
                        format!("{} is not a physical temperature", t),
                    ));
                }
                let mut env = Environment::new();
                env.set_sound_speed_from_temp(t);
                Ok(env)
            }
            (None, None) => Ok(Environment::new()),
        }
    }

    fn emitters(&self) -> Result<Vec<Emitter>, ConfigurationError> {
        match &self.emitters {
            EmitterLayout::Grid {
                rows,
                cols,
                pitch,
                center,
                frequency,
            } => {
                if !(pitch.is_finite() && *pitch > 0.) {
                    return Err(positive("emitters.grid.pitch"));
                }
                Ok(Grid {
                    frequency: *frequency * Hz,
                    ..Grid::centered(*rows, *cols, *pitch, Point3::from(*center))
                }
                .emitters())
            }
            EmitterLayout::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, e)| -> Result<Emitter, ConfigurationError> {
                    let normal = Some(Vector3::from(e.normal))
                        .filter(|n| n.iter().all(|v| v.is_finite()))
                        .and_then(|n| UnitVector3::try_new(n, f32::EPSILON))
                        .ok_or(GeometryError::InvalidNormal(i))?;
                    Ok(Emitter::new(
                        Point3::from(e.position),
                        normal,
                        e.frequency * Hz,
                    ))
                })
                .collect(),
        }
    }

    /// Validates the configuration and builds the array, the drive configuration and the solver
    /// option.
    pub fn build(&self) -> Result<(EmitterArray, DriveConfig, IBPOption), SonicError> {
        let array = EmitterArray::new(self.emitters()?, self.environment()?)?;
        let channels = array.num_emitters();

        let skew = match &self.skew {
            None => SkewCorrectionTable::zeros(channels),
            Some(SkewConfig::Cycles(offsets)) => SkewCorrectionTable::new(offsets.clone())?,
            Some(SkewConfig::DelaysNs(delays)) => {
                SkewCorrectionTable::from_delays_ns(delays, array.carrier())?
            }
        };
        if skew.len() != channels {
            return Err(ConfigurationError::InvalidValue(
                "skew",
                format!("expected {} entries, but got {}", channels, skew.len()),
            )
            .into());
        }

        let curve = match &self.duty_curve {
            None => DutyCycleCurve::default(),
            Some(points) => DutyCycleCurve::new(points.iter().map(|&[a, d]| (a, d)).collect())?,
        };
        let pwm = PwmConfig {
            period_ticks: self.pwm.period_ticks,
            min_on_ticks: self.pwm.min_on_ticks,
        };

        let drive = DriveConfig {
            normalizer: PhaseNormalizer::new(
                NonZeroU16::new(self.phase_steps)
                    .ok_or_else(|| positive("phase_steps"))?,
            ),
            mapper: PhaseToTimingMapper::new(curve, skew, pwm)?,
            scheduler: MuxScheduler::new(self.mux.to_config()?)?,
        };

        if !(self.solver.convergence_tol.is_finite() && self.solver.convergence_tol >= 0.) {
            return Err(ConfigurationError::InvalidValue(
                "solver.convergence_tol",
                "must be a finite non-negative value".to_string(),
            )
            .into());
        }
        let option = IBPOption {
            iterations: NonZeroUsize::new(self.solver.iterations)
                .ok_or_else(|| positive("solver.iterations"))?,
            convergence_tol: self.solver.convergence_tol,
        };

        Ok((array, drive, option))
    }
}
