use std::path::Path;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::domain::image_writer::ImageWriter;
use crate::pipeline::detect_faces_use_case::{DetectFacesUseCase, DetectionResult};

/// Single-image pipeline: open → grab → detect → annotate → write.
pub struct AnnotateImageUseCase {
    source: Box<dyn FrameSource>,
    image_writer: Box<dyn ImageWriter>,
    detect: DetectFacesUseCase,
}

impl AnnotateImageUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        image_writer: Box<dyn ImageWriter>,
        detect: DetectFacesUseCase,
    ) -> Self {
        Self {
            source,
            image_writer,
            detect,
        }
    }

    /// Annotates the source's first frame and writes it to `output_path`.
    /// Returns the detection result for reporting.
    pub fn execute(
        &mut self,
        output_path: &Path,
    ) -> Result<DetectionResult, Box<dyn std::error::Error>> {
        self.source.open()?;
        let grabbed = self.source.grab();
        self.source.release();

        let frame = grabbed?.ok_or("No image data found")?;
        let result = self.detect.execute(frame)?;
        self.image_writer.write(output_path, &result.frame)?;
        Ok(result)
    }
}
