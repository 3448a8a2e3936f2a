mod error;
mod frame;

pub use error::LinkError;
pub use frame::*;

use crate::geometry::EmitterArray;

/// A trait that provides the interface with the hardware.
///
/// A link must apply a [`Frame`] atomically: when [`send`] resolves with `Ok`, the whole frame
/// has been committed; when the returned future is dropped before completion, nothing is applied.
///
/// [`send`]: Link::send
pub trait Link: Send + 'static {
    /// Opens the link.
    fn open(
        &mut self,
        array: &EmitterArray,
    ) -> impl std::future::Future<Output = Result<(), LinkError>> + Send;

    /// Closes the link.
    fn close(&mut self) -> impl std::future::Future<Output = Result<(), LinkError>> + Send;

    /// Sends a frame to the hardware.
    fn send(
        &mut self,
        frame: &Frame,
    ) -> impl std::future::Future<Output = Result<(), LinkError>> + Send;

    /// Checks if the link is open.
    #[must_use]
    fn is_open(&self) -> bool;
}
