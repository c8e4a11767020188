use std::time::Duration;

pub const HAAR_CASCADE_NAME: &str = "haarcascade_frontalface_alt.xml";
pub const HAAR_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_alt.xml";

pub const LBP_CASCADE_NAME: &str = "lbpcascade_frontalface.xml";
pub const LBP_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/lbpcascades/lbpcascade_frontalface.xml";

/// Environment variable pointing at a directory of bundled cascade files.
pub const CASCADE_DIR_ENV: &str = "FACECAM_CASCADE_DIR";

/// Grab interval of the frame grabber (~30 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How long starting the camera waits for a previous connection to close.
pub const CAMERA_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_CAMERA_INDEX: i32 = 0;
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 2;
/// Minimum face size as a fraction of the frame height.
pub const DEFAULT_MIN_FACE_RATIO: f32 = 0.2;

pub const OVERLAY_COLOR: [u8; 3] = [0, 255, 0];
pub const OVERLAY_THICKNESS: u32 = 3;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
