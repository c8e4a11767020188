use crate::detection::domain::detection_params::DetectionParams;
use crate::shared::face_rect::FaceRect;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations may keep state across frames (e.g. a minimum face size
/// derived from the first frame), hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceRect>, Box<dyn std::error::Error>>;

    /// Applies new tuning parameters to a loaded detector. Detectors without
    /// tunable parameters ignore them.
    fn set_params(&mut self, _params: &DetectionParams) {}
}
