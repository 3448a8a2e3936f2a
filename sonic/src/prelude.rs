pub use crate::{
    config::ArrayConfig,
    error::{ConfigurationError, ErrorKind, SonicError},
    link::{Audit, AuditOption, Nop},
    session::{ArraySession, Inspector, Snapshot},
};

pub use sonic_core::{
    acoustics::{
        directivity::{Directivity, Sphere, T4010A1},
        field_at,
    },
    common::{Angle, Freq, Hz, PI, ULTRASOUND_FREQ, deg, kHz, mm, rad},
    environment::Environment,
    excitation::Excitation,
    geometry::*,
    link::{Frame, Link, LinkError},
};
pub use sonic_driver::{
    DriveConfig, DutyCycleCurve, MuxConfig, MuxScheduler, PhaseNormalizer, PhaseToTimingMapper,
    PwmConfig, SkewCorrectionTable,
};
pub use sonic_holo::{FocusPoint, IBP, IBPOption};
