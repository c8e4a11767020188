use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::overlay::domain::frame_annotator::FrameAnnotator;
use crate::shared::constants::{OVERLAY_COLOR, OVERLAY_THICKNESS};
use crate::shared::face_rect::FaceRect;
use crate::shared::frame::Frame;

/// Outlines each face with a solid rectangle.
///
/// The outline runs through the corners `(x, y)` and `(x + width,
/// y + height)`, both inclusive, with the stroke centered on that path.
/// Anything outside the frame is clipped.
pub struct BoxAnnotator {
    color: [u8; 3],
    thickness: u32,
}

impl BoxAnnotator {
    pub fn new(color: [u8; 3], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(OVERLAY_COLOR, OVERLAY_THICKNESS)
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        faces: &[FaceRect],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let channels = frame.channels();
        if channels != 3 {
            return Err(format!("cannot draw RGB outlines on a {channels}-channel frame").into());
        }

        let (width, height) = (frame.width(), frame.height());
        let mut canvas =
            ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(width, height, frame.data_mut())
                .ok_or("frame buffer does not match its dimensions")?;

        let t = self.thickness as i32;
        let half = t / 2;
        for face in faces {
            // One 1 px ring per stroke row, from the innermost outward.
            for grow in -half..t - half {
                let w = face.width + 1 + 2 * grow;
                let h = face.height + 1 + 2 * grow;
                if w <= 0 || h <= 0 {
                    continue;
                }
                let ring = Rect::at(face.x - grow, face.y - grow).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, ring, Rgb(self.color));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 3] = [0, 255, 0];

    fn blank(width: u32, height: u32) -> Frame {
        Frame::new(vec![0; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let i = (y * frame.width() as usize + x) * 3;
        let d = frame.data();
        [d[i], d[i + 1], d[i + 2]]
    }

    #[test]
    fn test_no_faces_frame_unchanged() {
        let mut frame = blank(20, 20);
        BoxAnnotator::default().annotate(&mut frame, &[]).unwrap();
        assert!(frame.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_thin_outline_hits_corners_only_on_path() {
        let mut frame = blank(10, 10);
        BoxAnnotator::new(GREEN, 1)
            .annotate(&mut frame, &[FaceRect::new(2, 2, 4, 4)])
            .unwrap();

        assert_eq!(pixel(&frame, 2, 2), GREEN);
        assert_eq!(pixel(&frame, 6, 6), GREEN);
        assert_eq!(pixel(&frame, 6, 2), GREEN);
        assert_eq!(pixel(&frame, 4, 2), GREEN);
        assert_eq!(pixel(&frame, 4, 4), [0, 0, 0]); // interior
        assert_eq!(pixel(&frame, 1, 1), [0, 0, 0]);
        assert_eq!(pixel(&frame, 7, 7), [0, 0, 0]);
    }

    #[test]
    fn test_thick_outline_is_centered() {
        let mut frame = blank(20, 20);
        BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(5, 5, 8, 8)])
            .unwrap();

        assert_eq!(pixel(&frame, 4, 4), GREEN); // one pixel outside
        assert_eq!(pixel(&frame, 6, 6), GREEN); // one pixel inside
        assert_eq!(pixel(&frame, 14, 14), GREEN);
        assert_eq!(pixel(&frame, 3, 3), [0, 0, 0]);
        assert_eq!(pixel(&frame, 7, 7), [0, 0, 0]);
        assert_eq!(pixel(&frame, 15, 15), [0, 0, 0]);
    }

    #[test]
    fn test_outline_is_clipped_at_frame_edges() {
        let mut frame = blank(10, 10);
        BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(-5, -5, 30, 30)])
            .unwrap();
        // Whole stroke lies outside the frame.
        assert!(frame.data().iter().all(|&v| v == 0));

        BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(0, 0, 9, 9)])
            .unwrap();
        assert_eq!(pixel(&frame, 0, 0), GREEN);
        assert_eq!(pixel(&frame, 9, 9), GREEN);
        assert_eq!(pixel(&frame, 5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_multiple_faces() {
        let mut frame = blank(40, 20);
        BoxAnnotator::new(GREEN, 1)
            .annotate(
                &mut frame,
                &[FaceRect::new(1, 1, 5, 5), FaceRect::new(20, 10, 5, 5)],
            )
            .unwrap();
        assert_eq!(pixel(&frame, 1, 1), GREEN);
        assert_eq!(pixel(&frame, 20, 10), GREEN);
        assert_eq!(pixel(&frame, 12, 5), [0, 0, 0]);
    }

    #[test]
    fn test_zero_thickness_draws_one_pixel() {
        let mut frame = blank(10, 10);
        BoxAnnotator::new(GREEN, 0)
            .annotate(&mut frame, &[FaceRect::new(2, 2, 4, 4)])
            .unwrap();
        assert_eq!(pixel(&frame, 2, 2), GREEN);
        assert_eq!(pixel(&frame, 3, 3), [0, 0, 0]);
    }

    #[test]
    fn test_zero_sized_face_keeps_outer_ring() {
        let mut frame = blank(10, 10);
        BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(4, 4, 0, 0)])
            .unwrap();
        assert_eq!(pixel(&frame, 3, 3), GREEN);
        assert_eq!(pixel(&frame, 5, 5), GREEN);
        assert_eq!(pixel(&frame, 2, 2), [0, 0, 0]);
    }

    #[test]
    fn test_two_channel_frame_rejected() {
        let mut frame = Frame::new(vec![0; 32], 4, 4, 2, 0);
        assert!(BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(0, 0, 2, 2)])
            .is_err());
    }

    #[test]
    fn test_single_channel_frame_rejected() {
        let mut frame = Frame::new(vec![0; 16], 4, 4, 1, 0);
        assert!(BoxAnnotator::default()
            .annotate(&mut frame, &[FaceRect::new(0, 0, 2, 2)])
            .is_err());
    }
}
