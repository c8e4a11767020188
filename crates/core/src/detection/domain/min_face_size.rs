/// Minimum face size derived from the frame height.
///
/// The size is computed from the first frame that yields a positive value
/// and then kept for the lifetime of the detector, so later frames of a
/// different size do not change it. Until then it is 0, meaning "no lower
/// bound".
#[derive(Clone, Debug)]
pub struct MinFaceSize {
    ratio: f32,
    resolved: Option<i32>,
}

impl MinFaceSize {
    pub fn new(ratio: f32) -> Self {
        Self {
            ratio,
            resolved: None,
        }
    }

    pub fn resolve(&mut self, frame_height: u32) -> i32 {
        if let Some(size) = self.resolved {
            return size;
        }
        let size = (frame_height as f32 * self.ratio).round() as i32;
        if size > 0 {
            self.resolved = Some(size);
            size
        } else {
            0
        }
    }

    pub fn resolved(&self) -> Option<i32> {
        self.resolved
    }
}
