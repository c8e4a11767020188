use crate::shared::face_rect::FaceRect;
use crate::shared::frame::Frame;

/// Domain interface for drawing detection results onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid allocation.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, faces: &[FaceRect])
        -> Result<(), Box<dyn std::error::Error>>;
}
