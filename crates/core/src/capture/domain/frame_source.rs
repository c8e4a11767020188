use crate::shared::frame::Frame;

/// A live source of frames, typically a camera.
///
/// The frame grabber drives a source from its own thread, hence `Send`.
/// Implementations convert their native pixel layout to RGB before
/// returning a [`Frame`].
pub trait FrameSource: Send {
    /// Acquires the underlying device. Fails when it cannot be opened.
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn is_opened(&self) -> bool;

    /// Reads the next frame. `Ok(None)` means the read succeeded but
    /// produced no image.
    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn release(&mut self);
}
