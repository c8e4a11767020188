use std::path::Path;

use crate::capture::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes a frame to an image file using the `image` crate. The format
/// follows the file extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb.repeat((width * height) as usize);
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_write_creates_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(40, 30, [1, 2, 3]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_written_pixels_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(16, 9, [50, 100, 200]))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 9));
        assert_eq!(img.get_pixel(15, 8).0, [50, 100, 200]);
    }

    #[test]
    fn test_unknown_extension_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknownformat");
        assert!(ImageFileWriter::new()
            .write(&path, &make_frame(4, 4, [0, 0, 0]))
            .is_err());
    }
}
