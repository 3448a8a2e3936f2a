use crate::common::{DEFAULT_SOUND_SPEED, METER};

/// The medium the ultrasound propagates through.
#[non_exhaustive]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// The speed of sound \[m/s\].
    pub sound_speed: f32,
}

impl Environment {
    /// Creates a new environment with the default sound speed (340m/s).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sound_speed: DEFAULT_SOUND_SPEED,
        }
    }

    /// Creates a new environment with the given sound speed.
    #[must_use]
    pub const fn with_sound_speed(sound_speed: f32) -> Self {
        Self { sound_speed }
    }

    /// Sets the sound speed from the temperature.
    ///
    /// This is equivalent to `Self::set_sound_speed_from_temp_with(t, 1.4, 8.314_463, 28.9647e-3)`.
    pub fn set_sound_speed_from_temp(&mut self, t: f32) {
        self.set_sound_speed_from_temp_with(t, 1.4, 8.314_463, 28.9647e-3);
    }

    /// Sets the sound speed from the temperature `t`, heat capacity ratio `k`, gas constant `r`,
    /// and molar mass `m` \[kg/mol\].
    pub fn set_sound_speed_from_temp_with(&mut self, t: f32, k: f32, r: f32, m: f32) {
        self.sound_speed = (k * r * (273.15 + t) / m).sqrt() * METER;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
