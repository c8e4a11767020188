use image::{DynamicImage, RgbImage};

use crate::shared::frame::Frame;

/// Expands an RGB [`Frame`] into the opaque RGBA buffer the GUI displays.
///
/// Returns `None` for frames that are not 3-channel.
pub fn frame_to_rgba(frame: &Frame) -> Option<Vec<u8>> {
    if frame.channels() != 3 {
        return None;
    }
    let rgb = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())?;
    Some(DynamicImage::ImageRgb8(rgb).into_rgba8().into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_rgba_adds_opaque_alpha() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, 3, 0);
        assert_eq!(
            frame_to_rgba(&frame),
            Some(vec![1, 2, 3, 255, 4, 5, 6, 255])
        );
    }

    #[test]
    fn test_frame_to_rgba_length() {
        let frame = Frame::new(vec![0u8; 640 * 480 * 3], 640, 480, 3, 0);
        assert_eq!(frame_to_rgba(&frame).map(|v| v.len()), Some(640 * 480 * 4));
    }

    #[test]
    fn test_frame_to_rgba_rejects_gray() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(frame_to_rgba(&frame).is_none());
    }
}
