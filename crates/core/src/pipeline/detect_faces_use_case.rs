use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::overlay::domain::frame_annotator::FrameAnnotator;
use crate::shared::face_rect::FaceRect;
use crate::shared::frame::Frame;

/// Output of one detection pass: the annotated frame and the faces drawn on it.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub frame: Frame,
    pub faces: Vec<FaceRect>,
}

/// Per-frame pipeline: detect → annotate.
pub struct DetectFacesUseCase {
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
}

impl DetectFacesUseCase {
    pub fn new(detector: Box<dyn FaceDetector>, annotator: Box<dyn FrameAnnotator>) -> Self {
        Self {
            detector,
            annotator,
        }
    }

    /// Retunes the loaded detector without reloading it.
    pub fn set_params(&mut self, params: &DetectionParams) {
        self.detector.set_params(params);
    }

    pub fn execute(&mut self, mut frame: Frame) -> Result<DetectionResult, Box<dyn std::error::Error>> {
        let faces = self.detector.detect(&frame)?;
        self.annotator.annotate(&mut frame, &faces)?;
        Ok(DetectionResult { frame, faces })
    }
}
