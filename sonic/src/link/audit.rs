use std::time::Duration;

use derive_more::Deref;
use sonic_core::{
    geometry::EmitterArray,
    link::{Frame, Link, LinkError},
};

/// The option of [`Audit`].
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct AuditOption {
    /// The time a frame takes to reach the hardware. A frame is committed only after it.
    pub latency: Option<Duration>,
    /// Makes [`Link::open`] fail, as if no device were attached.
    pub fail_on_open: bool,
    /// Starts broken. See [`Audit::break_down`].
    pub broken: bool,
}

/// A [`Link`] that records every committed frame.
///
/// A frame is committed only when [`Link::send`] completes. Dropping the send future before then,
/// for example because the push was superseded, leaves no trace.
#[derive(Debug, Default, Deref)]
pub struct Audit {
    option: AuditOption,
    is_open: bool,
    broken: bool,
    num_channels: usize,
    #[deref]
    frames: Vec<Frame>,
}

impl Audit {
    /// Creates a new [`Audit`].
    #[must_use]
    pub const fn new(option: AuditOption) -> Self {
        Self {
            option,
            is_open: false,
            broken: false,
            num_channels: 0,
            frames: Vec::new(),
        }
    }

    /// Makes subsequent sends fail.
    pub const fn break_down(&mut self) {
        self.broken = true;
    }

    /// Makes subsequent sends succeed again.
    pub const fn repair(&mut self) {
        self.broken = false;
    }

    /// Returns `true` if the link is broken.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        self.broken
    }

    /// The committed frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The most recently committed frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Link for Audit {
    async fn open(&mut self, array: &EmitterArray) -> Result<(), LinkError> {
        if self.option.fail_on_open {
            return Err(LinkError::new("No device found"));
        }
        self.is_open = true;
        self.broken = self.option.broken;
        self.num_channels = array.num_emitters();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), LinkError> {
        if !self.is_open {
            return Err(LinkError::closed());
        }
        if let Some(latency) = self.option.latency {
            tokio::time::sleep(latency).await;
        }
        if self.broken {
            return Err(LinkError::new("broken"));
        }
        if frame.entries().len() != self.num_channels {
            return Err(LinkError::new(format!(
                "Frame has {} entries, but the array has {} channels",
                frame.entries().len(),
                self.num_channels
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
