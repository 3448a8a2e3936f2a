use sonic_core::{
    geometry::EmitterArray,
    link::{Frame, Link, LinkError},
};

/// A [`Link`] that accepts every frame and discards it.
///
/// Useful when no hardware is attached and only the computed excitations are of interest.
#[derive(Debug, Default)]
pub struct Nop {
    is_open: bool,
}

impl Nop {
    /// Creates a new [`Nop`].
    #[must_use]
    pub const fn new() -> Self {
        Self { is_open: false }
    }
}

impl Link for Nop {
    async fn open(&mut self, _: &EmitterArray) -> Result<(), LinkError> {
        self.is_open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    async fn send(&mut self, _: &Frame) -> Result<(), LinkError> {
        if !self.is_open {
            return Err(LinkError::closed());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
