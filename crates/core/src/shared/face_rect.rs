/// Axis-aligned face rectangle in the coordinates of the frame it was
/// detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersects the rectangle with a `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when nothing of the rectangle remains inside.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<FaceRect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(frame_width as i32);
        let y1 = self.bottom().min(frame_height as i32);
        let clamped = FaceRect::new(x0, y0, x1 - x0, y1 - y0);
        (!clamped.is_empty()).then_some(clamped)
    }
}

impl std::fmt::Display for FaceRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}
