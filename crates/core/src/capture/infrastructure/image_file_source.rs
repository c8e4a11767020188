use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Serves a still image as a frame source.
///
/// Every [`FrameSource::grab`] returns the same picture with an increasing
/// sequence number, so an image can stand in for a camera.
pub struct ImageFileSource {
    path: PathBuf,
    image: Option<Frame>,
    sequence: usize,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            image: None,
            sequence: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let img = image::open(&self.path)?.to_rgb8();
        let (width, height) = img.dimensions();
        self.image = Some(Frame::new(img.into_raw(), width, height, 3, 0));
        self.sequence = 0;
        Ok(())
    }

    fn is_opened(&self) -> bool {
        self.image.is_some()
    }

    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| format!("{} is not open", self.path.display()))?;
        let frame = Frame::new(
            image.data().to_vec(),
            image.width(),
            image.height(),
            image.channels(),
            self.sequence,
        );
        self.sequence += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(8, 6, |x, y| image::Rgb([x as u8 * 10, y as u8 * 10, 7]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_and_grab() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "still.png");
        let mut source = ImageFileSource::new(&path);
        assert!(!source.is_opened());

        source.open().unwrap();
        assert!(source.is_opened());

        let frame = source.grab().unwrap().unwrap();
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.channels(), 3);
        // pixel (x=2, y=1)
        let idx = (6 + 2) * 3;
        assert_eq!(&frame.data()[idx..idx + 3], &[20, 10, 7]);
    }

    #[test]
    fn test_repeated_grabs_advance_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "still.png");
        let mut source = ImageFileSource::new(path);
        source.open().unwrap();
        let a = source.grab().unwrap().unwrap();
        let b = source.grab().unwrap().unwrap();
        assert_eq!(a.sequence(), 0);
        assert_eq!(b.sequence(), 1);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let mut source = ImageFileSource::new("/nonexistent/still.png");
        assert!(source.open().is_err());
        assert!(!source.is_opened());
    }

    #[test]
    fn test_release_closes_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "still.png");
        let mut source = ImageFileSource::new(path);
        source.open().unwrap();
        source.release();
        assert!(!source.is_opened());
        assert!(source.grab().is_err());
    }
}
